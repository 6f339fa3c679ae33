//! # Abstract Syntax Tree
//!
//! The tree produced by [`analyzer::parsers`](crate::analyzer::parsers) for a
//! formula or a single knowledge sub-condition. It carries no source spans;
//! syntax errors are reported by the parser before a tree exists.

use std::fmt;

pub use crate::tokenizer::literal::Literal;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `a < b <= c` means `a < b and b <= c`, with `b` evaluated once
    Comparison {
        first: Box<Expression>,
        rest: Vec<(ComparisonOperator, Expression)>,
    },
    FunctionCall {
        function: String,
        arguments: Vec<Expression>,
    },
}

impl Expression {
    /// Variable names referenced by the expression, in order of first use.
    ///
    /// Function names are not included.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Variable(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Expression::Unary { operand, .. } => operand.collect_variables(names),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expression::Comparison { first, rest } => {
                first.collect_variables(names);
                for (_, operand) in rest {
                    operand.collect_variables(names);
                }
            }
            Expression::FunctionCall { arguments, .. } => {
                for argument in arguments {
                    argument.collect_variables(names);
                }
            }
        }
    }

    /// Names of the functions called anywhere in the expression.
    pub fn functions(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_functions(&mut names);
        names
    }

    fn collect_functions(&self, names: &mut Vec<String>) {
        match self {
            Expression::Literal(_) | Expression::Variable(_) => {}
            Expression::Unary { operand, .. } => operand.collect_functions(names),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_functions(names);
                right.collect_functions(names);
            }
            Expression::Comparison { first, rest } => {
                first.collect_functions(names);
                for (_, operand) in rest {
                    operand.collect_functions(names);
                }
            }
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                if !names.contains(function) {
                    names.push(function.clone());
                }
                for argument in arguments {
                    argument.collect_functions(names);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    And,
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
            BinaryOperator::Power => write!(f, "**"),
            BinaryOperator::And => write!(f, "and"),
            BinaryOperator::Or => write!(f, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Equal => write!(f, "=="),
            ComparisonOperator::NotEqual => write!(f, "!="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::LessThanEqual => write!(f, "<="),
            ComparisonOperator::GreaterThanEqual => write!(f, ">="),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expression {
        Expression::Variable(name.to_string())
    }

    #[test]
    fn test_variables_in_first_use_order() {
        // round(weight / (height ** 2)) + weight
        let expr = Expression::BinaryOp {
            op: BinaryOperator::Add,
            left: Box::new(Expression::FunctionCall {
                function: "round".to_string(),
                arguments: vec![Expression::BinaryOp {
                    op: BinaryOperator::Divide,
                    left: Box::new(var("weight")),
                    right: Box::new(Expression::BinaryOp {
                        op: BinaryOperator::Power,
                        left: Box::new(var("height")),
                        right: Box::new(Expression::Literal(Literal::Number(2.0))),
                    }),
                }],
            }),
            right: Box::new(var("weight")),
        };
        assert_eq!(expr.variables(), vec!["weight", "height"]);
        assert_eq!(expr.functions(), vec!["round"]);
    }

    #[test]
    fn test_comparison_chain_variables() {
        let expr = Expression::Comparison {
            first: Box::new(Expression::Literal(Literal::Number(0.0))),
            rest: vec![
                (ComparisonOperator::LessThanEqual, var("BMI")),
                (ComparisonOperator::LessThan, var("limit")),
            ],
        };
        assert_eq!(expr.variables(), vec!["BMI", "limit"]);
        assert!(expr.functions().is_empty());
    }
}
