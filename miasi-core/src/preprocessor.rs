//! # Preprocessor
//!
//! Sits between the tokenizer and the parser, and in front of the condition
//! evaluator:
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Parser → AST → Evaluator
//! ```
//!
//! * [`TokenPreprocessor`]: drops whitespace and newline tokens
//! * [`ConditionSplitter`]: splits a knowledge condition into its
//!   sub-conditions on the configured delimiter
//!
//! ```rust
//! use miasi_core::preprocessor::{ConditionSplitter, Preprocessor};
//!
//! let splitter = ConditionSplitter::new(" and ");
//! assert_eq!(
//!     splitter.process("BMI >= 25 and age > 40"),
//!     vec!["BMI >= 25", "age > 40"]
//! );
//! ```

use crate::tokenizer::token::TokenSpan;

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    fn process(&self, input: T) -> U;
}

/// Token-specific preprocessor implementation
#[derive(Debug, Default, Clone)]
pub struct TokenPreprocessor {}

impl TokenPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<Vec<TokenSpan>> for TokenPreprocessor {
    fn process(&self, input: Vec<TokenSpan>) -> Vec<TokenSpan> {
        input
            .into_iter()
            .filter(|span| !span.token.is_formatting())
            .collect()
    }
}

/// Splits a knowledge condition on a literal delimiter.
///
/// The split is purely textual. Every piece is trimmed; empty pieces are kept
/// so that a dangling delimiter surfaces as a syntax error later.
#[derive(Debug, Clone)]
pub struct ConditionSplitter {
    delimiter: String,
}

impl ConditionSplitter {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl<'a> Preprocessor<&'a str, Vec<&'a str>> for ConditionSplitter {
    fn process(&self, input: &'a str) -> Vec<&'a str> {
        if self.delimiter.is_empty() {
            return vec![input.trim()];
        }
        input.split(self.delimiter.as_str()).map(str::trim).collect()
    }
}
