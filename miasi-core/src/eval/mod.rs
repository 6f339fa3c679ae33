//! # Evaluator
//!
//! Compiles formula and condition text into a [`CompiledExpression`] and
//! evaluates it against a [`Variables`] mapping.
//!
//! ```rust
//! use miasi_core::eval::{CompiledExpression, Value, Variables};
//!
//! let formula = CompiledExpression::compile("weight / (height ** 2)").unwrap();
//! let mut variables = Variables::new();
//! variables.insert("weight".to_string(), Value::Number(70.0));
//! variables.insert("height".to_string(), Value::Number(1.75));
//! let bmi = formula.evaluate_number(&variables).unwrap();
//! assert!((bmi - 22.857).abs() < 1e-3);
//! ```

use std::collections::HashMap;
use thiserror::Error;

use crate::analyzer::parsers::parse_complete;
use crate::ast::Expression;
use crate::preprocessor::{Preprocessor, TokenPreprocessor};
use crate::tokenizer::{
    keyword::Keyword,
    symbol::{Delimiter, Operator},
    token::{Token, Tokenizer},
};

pub mod expression;
pub mod functions;
pub mod value;

pub use expression::ExpressionEvaluator;
pub use value::Value;

/// Variable name → value, the only state an expression can read.
pub type Variables = HashMap<String, Value>;

pub type EvalResult<T> = Result<T, EvalError>;

/// Nesting limit used by [`CompiledExpression::compile`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("invalid syntax: {0}")]
    Syntax(String),
    #[error("name '{0}' is not defined")]
    UndefinedVariable(String),
    #[error("function '{0}' is not allowed")]
    UnknownFunction(String),
    #[error("{function}() takes {expected} argument(s), {found} given")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operand type for {operation}: {found}")]
    TypeMismatch { operation: String, found: String },
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expected a numeric result, got {0}")]
    NonNumeric(String),
    #[error("expression is nested {depth} levels deep, the limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
}

/// A parsed formula or condition, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Expression,
}

impl CompiledExpression {
    pub fn compile(source: &str) -> EvalResult<Self> {
        Self::compile_with_limit(source, DEFAULT_MAX_DEPTH)
    }

    /// Compiles `source`, rejecting input nested deeper than `max_depth`.
    ///
    /// Nesting counts parentheses, runs of prefix operators and chains of
    /// binary operators, checked on the token stream before any tree is
    /// built.
    #[tracing::instrument(level = "debug")]
    pub fn compile_with_limit(source: &str, max_depth: usize) -> EvalResult<Self> {
        let spans = Tokenizer::new()
            .tokenize(source)
            .map_err(|e| EvalError::Syntax(e.to_string()))?;
        let spans = TokenPreprocessor::new().process(spans);
        let tokens: Vec<Token> = spans.iter().map(|span| span.token.clone()).collect();

        let depth = nesting_depth(&tokens);
        if depth > max_depth {
            return Err(EvalError::TooDeep {
                depth,
                limit: max_depth,
            });
        }

        let ast = parse_complete(&tokens).map_err(|e| {
            tracing::debug!(error = %e, "parse failed");
            let message = match spans.get(e.position()) {
                Some(span) => format!(
                    "unexpected '{}' at line {}, column {}",
                    span.token, span.line, span.column
                ),
                None => "unexpected end of expression".to_string(),
            };
            EvalError::Syntax(message)
        })?;

        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Variable names the expression reads, in order of first use.
    pub fn variables(&self) -> Vec<String> {
        self.ast.variables()
    }

    pub fn evaluate(&self, variables: &Variables) -> EvalResult<Value> {
        ExpressionEvaluator::new(variables).eval_expression(&self.ast)
    }

    /// Evaluates a formula; a boolean result counts as 1 or 0.
    pub fn evaluate_number(&self, variables: &Variables) -> EvalResult<f64> {
        match self.evaluate(variables)? {
            Value::Number(n) => Ok(n),
            Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            other => Err(EvalError::NonNumeric(other.type_name().to_string())),
        }
    }

    pub fn evaluate_truthy(&self, variables: &Variables) -> EvalResult<bool> {
        Ok(self.evaluate(variables)?.is_truthy())
    }
}

/// Upper bound on the depth of the tree an expression parses into.
///
/// A run of binary operators folds into a chain as deep as the run is long,
/// so every binary operator counts, as do parentheses and consecutive prefix
/// operators (`-`, `+`, `not`). Comparisons fold into one flat node and do
/// not count.
fn nesting_depth(tokens: &[Token]) -> usize {
    let mut frames = vec![DepthFrame::default()];
    let mut prefix_run = 0;
    let mut expect_operand = true;

    for token in tokens {
        let is_prefix = expect_operand
            && matches!(
                token,
                Token::Operator(Operator::Minus | Operator::Plus) | Token::Keyword(Keyword::Not)
            );
        if is_prefix {
            prefix_run += 1;
            continue;
        }

        match token {
            Token::Delimiter(Delimiter::OpenParen) => {
                frames.push(DepthFrame {
                    prefix: prefix_run,
                    ..DepthFrame::default()
                });
                expect_operand = true;
            }
            Token::Delimiter(Delimiter::CloseParen) => {
                if frames.len() > 1 {
                    if let Some(frame) = frames.pop() {
                        close_frame(&mut frames, frame);
                    }
                }
                expect_operand = false;
            }
            Token::Delimiter(Delimiter::Comma) => {
                if let Some(frame) = frames.last_mut() {
                    frame.finish_argument();
                }
                expect_operand = true;
            }
            Token::Operator(
                Operator::EqualEqual
                | Operator::NotEqual
                | Operator::Greater
                | Operator::GreaterEqual
                | Operator::Less
                | Operator::LessEqual,
            ) => expect_operand = true,
            Token::Operator(_) | Token::Keyword(Keyword::And | Keyword::Or) => {
                if let Some(frame) = frames.last_mut() {
                    frame.operators += 1;
                }
                expect_operand = true;
            }
            _ => {
                if let Some(frame) = frames.last_mut() {
                    frame.inner = frame.inner.max(prefix_run);
                }
                expect_operand = false;
            }
        }
        prefix_run = 0;
    }

    // A trailing prefix run with no operand still nests
    if let Some(frame) = frames.last_mut() {
        frame.inner = frame.inner.max(prefix_run);
    }
    while frames.len() > 1 {
        if let Some(frame) = frames.pop() {
            close_frame(&mut frames, frame);
        }
    }
    frames.pop().map(|mut root| root.finish()).unwrap_or(0)
}

/// One parenthesised group (or the whole expression) while measuring depth.
#[derive(Debug, Default)]
struct DepthFrame {
    /// Prefix operators applied to the group itself
    prefix: usize,
    /// Binary operators in the current argument
    operators: usize,
    /// Deepest operand of the current argument
    inner: usize,
    /// Deepest finished argument, for call argument lists
    best: usize,
}

impl DepthFrame {
    fn finish_argument(&mut self) {
        self.best = self.best.max(self.operators + self.inner);
        self.operators = 0;
        self.inner = 0;
    }

    fn finish(&mut self) -> usize {
        self.finish_argument();
        self.best
    }
}

fn close_frame(frames: &mut [DepthFrame], mut frame: DepthFrame) {
    let depth = frame.finish() + 1 + frame.prefix;
    if let Some(parent) = frames.last_mut() {
        parent.inner = parent.inner.max(depth);
    }
}
