//! # Operators and delimiters
//!
//! Symbols are matched longest first, so `**` is never read as two `*` and
//! `<=` is never read as `<` followed by a stray `=`.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    #[strum(serialize = "==")]
    EqualEqual,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,

    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    /// Exponentiation (`**`)
    #[strum(serialize = "**")]
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    #[strum(serialize = "(")]
    OpenParen,
    #[strum(serialize = ")")]
    CloseParen,
    /// Separates function arguments
    #[strum(serialize = ",")]
    Comma,
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                // Multi-character operators (matched first for longest-match)
                value(Operator::Power, tag("**")),
                value(Operator::EqualEqual, tag("==")),
                value(Operator::NotEqual, tag("!=")),
                value(Operator::GreaterEqual, tag(">=")),
                value(Operator::LessEqual, tag("<=")),
                // Single-character operators
                value(Operator::Greater, tag(">")),
                value(Operator::Less, tag("<")),
                value(Operator::Plus, tag("+")),
                value(Operator::Minus, tag("-")),
                value(Operator::Multiply, tag("*")),
                value(Operator::Divide, tag("/")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::Comma, tag(",")),
            )),
            Token::Delimiter,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let test_cases = [
            ("**", Token::Operator(Operator::Power)),
            ("==", Token::Operator(Operator::EqualEqual)),
            ("!=", Token::Operator(Operator::NotEqual)),
            (">=", Token::Operator(Operator::GreaterEqual)),
            ("<=", Token::Operator(Operator::LessEqual)),
            (">", Token::Operator(Operator::Greater)),
            ("<", Token::Operator(Operator::Less)),
            ("+", Token::Operator(Operator::Plus)),
            ("-", Token::Operator(Operator::Minus)),
            ("*", Token::Operator(Operator::Multiply)),
            ("/", Token::Operator(Operator::Divide)),
        ];

        for (input, expected) in test_cases {
            let (rest, token) = parse_operator(input).unwrap();
            assert_eq!(token, expected, "operator {}", input);
            assert_eq!(rest, "");
        }
    }

    #[test]
    fn test_longest_match() {
        let (rest, token) = parse_operator("** 2").unwrap();
        assert_eq!(token, Token::Operator(Operator::Power));
        assert_eq!(rest, " 2");

        let (rest, token) = parse_operator("<=BMI").unwrap();
        assert_eq!(token, Token::Operator(Operator::LessEqual));
        assert_eq!(rest, "BMI");
    }

    #[test]
    fn test_delimiters() {
        let (rest, token) = parse_delimiter("(height").unwrap();
        assert_eq!(token, Token::Delimiter(Delimiter::OpenParen));
        assert_eq!(rest, "height");

        let (_, token) = parse_delimiter(", 2)").unwrap();
        assert_eq!(token, Token::Delimiter(Delimiter::Comma));
    }

    #[test]
    fn test_single_equal_is_rejected() {
        assert!(parse_operator("= 1").is_err());
        assert!(parse_delimiter("= 1").is_err());
    }

    #[test]
    fn test_display_matches_source_text() {
        assert_eq!(Operator::Power.to_string(), "**");
        assert_eq!(Operator::LessEqual.as_ref(), "<=");
    }
}
