//! Token-level parsers shared by the grammar, and the entry point that
//! parses a complete token stream.

use super::{core::*, prelude::*};
use crate::ast;
use crate::tokenizer::{
    keyword::Keyword,
    literal::Literal,
    symbol::{Delimiter, Operator},
    token::Token,
};

pub mod expression;

pub use expression::parse_expression;

/// Parses the whole token stream as one expression.
///
/// Trailing tokens are an error, so `weight height` is rejected rather than
/// silently read as `weight`.
#[tracing::instrument(level = "debug", skip(tokens))]
pub fn parse_complete(tokens: &[Token]) -> Result<ast::Expression, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEOF { position: 0 });
    }
    let (pos, expression) = parse_expression().parse(tokens, 0)?;
    match tokens.get(pos) {
        None => Ok(expression),
        Some(token) => Err(ParseError::Unexpected {
            expected: "end of expression".to_string(),
            found: token.to_string(),
            position: pos,
        }),
    }
}

pub fn parse_identifier() -> impl Parser<Token, String> {
    with_context(
        satisfy(|token| match token {
            Token::Identifier(s) => Some(s.clone()),
            _ => None,
        }),
        "identifier",
    )
}

pub fn parse_literal() -> impl Parser<Token, ast::Literal> {
    with_context(
        satisfy(|token| match token {
            Token::Literal(Literal::Number(n)) => Some(ast::Literal::Number(*n)),
            Token::Literal(Literal::String(s)) => Some(ast::Literal::String(s.clone())),
            Token::Literal(Literal::Boolean(b)) => Some(ast::Literal::Boolean(*b)),
            Token::Keyword(Keyword::True) => Some(ast::Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => Some(ast::Literal::Boolean(false)),
            _ => None,
        }),
        "literal",
    )
}

pub fn parse_comma() -> impl Parser<Token, Token> {
    with_context(equal(Token::Delimiter(Delimiter::Comma)), "comma")
}

pub fn parse_open_paren() -> impl Parser<Token, Token> {
    equal(Token::Delimiter(Delimiter::OpenParen))
}

pub fn parse_close_paren() -> impl Parser<Token, Token> {
    equal(Token::Delimiter(Delimiter::CloseParen))
}

pub fn parse_keyword(keyword: Keyword) -> impl Parser<Token, Token> {
    equal(Token::Keyword(keyword))
}

pub fn parse_symbol(operator: Operator) -> impl Parser<Token, Token> {
    equal(Token::Operator(operator))
}
