//! Expression grammar, loosest binding first:
//!
//! ```text
//! expression     := or
//! or             := and ("or" and)*
//! and            := not ("and" not)*
//! not            := "not"* comparison
//! comparison     := additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)*
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/") unary)*
//! unary          := ("+" | "-")* power
//! power          := primary ("**" ("+" | "-")* primary)*
//! primary        := call | literal | identifier | "(" expression ")"
//! call           := identifier "(" (expression ("," expression)*)? ")"
//! ```
//!
//! `**` is right-associative and binds tighter than a unary sign on its left,
//! so `-2 ** 2` is `-(2 ** 2)` while `2 ** -1` is `2 ** (-1)`.
//! Repetition is folded iteratively; only parentheses and call arguments
//! recurse.

use super::{
    super::{core::*, prelude::*},
    *,
};
use crate::ast;
use crate::tokenizer::{keyword::Keyword, symbol::Operator, token::Token};

pub fn parse_expression() -> impl Parser<Token, ast::Expression> {
    with_context(parse_logical_or(), "expression")
}

fn fold_binary(
    first: ast::Expression,
    rest: Vec<(ast::BinaryOperator, ast::Expression)>,
) -> ast::Expression {
    rest.into_iter()
        .fold(first, |left, (op, right)| ast::Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
}

fn parse_logical_or() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_logical_and(),
                many(tuple2(parse_operator_or(), parse_logical_and())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical or",
    )
}

fn parse_logical_and() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_logical_not(),
                many(tuple2(parse_operator_and(), parse_logical_not())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical and",
    )
}

fn parse_logical_not() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(many(parse_keyword(Keyword::Not)), parse_comparison()),
            |(nots, operand)| {
                nots.into_iter()
                    .fold(operand, |operand, _| ast::Expression::Unary {
                        op: ast::UnaryOperator::Not,
                        operand: Box::new(operand),
                    })
            },
        ),
        "logical not",
    )
}

fn parse_operator_or() -> impl Parser<Token, ast::BinaryOperator> {
    map(parse_keyword(Keyword::Or), |_| ast::BinaryOperator::Or)
}

fn parse_operator_and() -> impl Parser<Token, ast::BinaryOperator> {
    map(parse_keyword(Keyword::And), |_| ast::BinaryOperator::And)
}

fn parse_comparison() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_additive(),
                many(tuple2(parse_operator_comparison(), parse_additive())),
            ),
            |(first, rest)| {
                if rest.is_empty() {
                    first
                } else {
                    ast::Expression::Comparison {
                        first: Box::new(first),
                        rest,
                    }
                }
            },
        ),
        "comparison",
    )
}

fn parse_operator_comparison() -> impl Parser<Token, ast::ComparisonOperator> {
    with_context(
        choice(vec![
            Box::new(parse_comparison_operator(
                Operator::EqualEqual,
                ast::ComparisonOperator::Equal,
            )),
            Box::new(parse_comparison_operator(
                Operator::NotEqual,
                ast::ComparisonOperator::NotEqual,
            )),
            Box::new(parse_comparison_operator(
                Operator::Greater,
                ast::ComparisonOperator::GreaterThan,
            )),
            Box::new(parse_comparison_operator(
                Operator::GreaterEqual,
                ast::ComparisonOperator::GreaterThanEqual,
            )),
            Box::new(parse_comparison_operator(
                Operator::Less,
                ast::ComparisonOperator::LessThan,
            )),
            Box::new(parse_comparison_operator(
                Operator::LessEqual,
                ast::ComparisonOperator::LessThanEqual,
            )),
        ]),
        "comparison operator",
    )
}

fn parse_comparison_operator(
    symbol: Operator,
    op: ast::ComparisonOperator,
) -> impl Parser<Token, ast::ComparisonOperator> {
    map(parse_symbol(symbol), move |_| op)
}

fn parse_binary_operator(
    symbol: Operator,
    op: ast::BinaryOperator,
) -> impl Parser<Token, ast::BinaryOperator> {
    map(parse_symbol(symbol), move |_| op)
}

fn parse_additive() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_multiplicative(),
                many(tuple2(
                    choice(vec![
                        Box::new(parse_binary_operator(
                            Operator::Plus,
                            ast::BinaryOperator::Add,
                        )),
                        Box::new(parse_binary_operator(
                            Operator::Minus,
                            ast::BinaryOperator::Subtract,
                        )),
                    ]),
                    parse_multiplicative(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "additive",
    )
}

fn parse_multiplicative() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_unary(),
                many(tuple2(
                    choice(vec![
                        Box::new(parse_binary_operator(
                            Operator::Multiply,
                            ast::BinaryOperator::Multiply,
                        )),
                        Box::new(parse_binary_operator(
                            Operator::Divide,
                            ast::BinaryOperator::Divide,
                        )),
                    ]),
                    parse_unary(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "multiplicative",
    )
}

fn parse_sign() -> impl Parser<Token, ast::UnaryOperator> {
    with_context(
        choice(vec![
            Box::new(map(parse_symbol(Operator::Minus), |_| {
                ast::UnaryOperator::Negate
            })),
            Box::new(map(parse_symbol(Operator::Plus), |_| {
                ast::UnaryOperator::Plus
            })),
        ]),
        "sign",
    )
}

/// Wraps `operand` in the signs, the first sign outermost.
fn apply_signs(signs: Vec<ast::UnaryOperator>, operand: ast::Expression) -> ast::Expression {
    signs
        .into_iter()
        .rev()
        .fold(operand, |operand, op| ast::Expression::Unary {
            op,
            operand: Box::new(operand),
        })
}

fn parse_unary() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(tuple2(many(parse_sign()), parse_power()), |(signs, operand)| {
            apply_signs(signs, operand)
        }),
        "unary",
    )
}

fn parse_power() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_primary(),
                many(preceded(
                    parse_symbol(Operator::Power),
                    tuple2(many(parse_sign()), parse_primary()),
                )),
            ),
            |(base, exponents)| {
                // a ** -b ** c  ==  a ** (-(b ** c))
                let mut exponents = exponents;
                let Some((signs, last)) = exponents.pop() else {
                    return base;
                };
                let mut acc = apply_signs(signs, last);
                while let Some((signs, operand)) = exponents.pop() {
                    acc = apply_signs(
                        signs,
                        ast::Expression::BinaryOp {
                            op: ast::BinaryOperator::Power,
                            left: Box::new(operand),
                            right: Box::new(acc),
                        },
                    );
                }
                ast::Expression::BinaryOp {
                    op: ast::BinaryOperator::Power,
                    left: Box::new(base),
                    right: Box::new(acc),
                }
            },
        ),
        "power",
    )
}

fn parse_primary() -> impl Parser<Token, ast::Expression> {
    with_context(
        choice(vec![
            Box::new(parse_function_call()),
            Box::new(map(parse_literal(), ast::Expression::Literal)),
            Box::new(map(parse_identifier(), ast::Expression::Variable)),
            Box::new(parse_parenthesized()),
        ]),
        "primary",
    )
}

fn parse_parenthesized() -> impl Parser<Token, ast::Expression> {
    with_context(
        delimited(
            as_unit(parse_open_paren()),
            lazy(parse_expression),
            as_unit(parse_close_paren()),
        ),
        "parenthesized expression",
    )
}

fn parse_function_call() -> impl Parser<Token, ast::Expression> {
    with_context(
        map(
            tuple2(
                parse_identifier(),
                delimited(
                    as_unit(parse_open_paren()),
                    separated_list(lazy(parse_expression), as_unit(parse_comma())),
                    as_unit(parse_close_paren()),
                ),
            ),
            |(function, arguments)| ast::Expression::FunctionCall {
                function,
                arguments,
            },
        ),
        "function call",
    )
}
