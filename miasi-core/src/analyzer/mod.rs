//! # Analyzer
//!
//! Turns the preprocessed token stream into an [`ast::Expression`] with a
//! parser combinator design:
//!
//! 1. [`Parser`]: the parsing contract, positions are token indices
//! 2. [`combinators`]: small composable parser units
//! 3. [`parsers`]: the expression grammar built from them
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer/Parser → AST → Evaluator
//! ```
//!
//! ```rust
//! use miasi_core::analyzer::prelude::*;
//! use miasi_core::analyzer::Parser;
//! use miasi_core::tokenizer::token::Token;
//!
//! let parser = equal(Token::Identifier("BMI".to_string()));
//! let tokens = vec![Token::Identifier("BMI".to_string())];
//! assert_eq!(parser.parse(&tokens, 0).unwrap().0, 1);
//! ```

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use self::core::ParseError;
pub use self::core::ParseResult;
pub use self::core::Parser;

pub use crate::ast;
