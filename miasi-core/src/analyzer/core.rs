//! # Core Parser Definitions
//!
//! The parser interface and error type every combinator builds on.

use thiserror::Error;

/// Parser trait defines the core parsing interface.
///
/// A parser takes an input slice and a position, and returns either the new
/// position together with the parsed value, or a [`ParseError`].
///
/// # Type Parameters
///
/// * `I` - The input token type
/// * `O` - The output value type
pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

/// On success, the new position and the parsed value.
pub type ParseResult<O> = Result<(usize, O), ParseError>;

/// Positions are token indices, not byte offsets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of expression")]
    UnexpectedEOF { position: usize },
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("no alternative matched")]
    NoAlternative { position: usize },
    #[error("{message}")]
    Failure { message: String, position: usize },
    #[error("{message}: {inner}")]
    WithContext {
        message: String,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    pub fn with_context(self, ctx: &str) -> Self {
        ParseError::WithContext {
            message: ctx.to_string(),
            inner: Box::new(self),
        }
    }

    /// Index of the token the error was detected at.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedEOF { position }
            | ParseError::Unexpected { position, .. }
            | ParseError::NoAlternative { position }
            | ParseError::Failure { position, .. } => *position,
            ParseError::WithContext { inner, .. } => inner.position(),
        }
    }

    /// The innermost error, with every context layer removed.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_position() {
        let err = ParseError::Unexpected {
            expected: ")".to_string(),
            found: ",".to_string(),
            position: 4,
        }
        .with_context("primary")
        .with_context("expression");

        assert_eq!(err.position(), 4);
        assert_eq!(err.to_string(), "expression: primary: expected ), found ,");
        assert!(matches!(err.root(), ParseError::Unexpected { .. }));
    }
}
