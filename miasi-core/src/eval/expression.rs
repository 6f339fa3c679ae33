use std::cmp::Ordering;

use super::functions::{finite, power, BuiltinFunction};
use super::{EvalError, EvalResult, Value, Variables};
use crate::ast::{BinaryOperator, ComparisonOperator, Expression, Literal, UnaryOperator};

/// Tree-walking evaluator over a fixed variable mapping.
///
/// The evaluator reads nothing but `variables` and the built-in functions.
pub struct ExpressionEvaluator<'a> {
    variables: &'a Variables,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Self { variables }
    }

    pub fn eval_expression(&self, expression: &Expression) -> EvalResult<Value> {
        match expression {
            Expression::Literal(lit) => Ok(Self::eval_literal(lit)),
            Expression::Variable(name) => self.eval_variable(name),
            Expression::Unary { op, operand } => self.eval_unary(*op, operand),
            Expression::BinaryOp { op, left, right } => self.eval_binary_op(*op, left, right),
            Expression::Comparison { first, rest } => self.eval_comparison(first, rest),
            Expression::FunctionCall {
                function,
                arguments,
            } => self.eval_function_call(function, arguments),
        }
    }

    fn eval_literal(lit: &Literal) -> Value {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::Text(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
        }
    }

    fn eval_variable(&self, name: &str) -> EvalResult<Value> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))
    }

    fn eval_unary(&self, op: UnaryOperator, operand: &Expression) -> EvalResult<Value> {
        let value = self.eval_expression(operand)?;
        match op {
            UnaryOperator::Not => Ok(Value::Boolean(!value.is_truthy())),
            UnaryOperator::Negate => Ok(Value::Number(-value.to_number("unary -")?)),
            UnaryOperator::Plus => Ok(Value::Number(value.to_number("unary +")?)),
        }
    }

    fn eval_binary_op(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Value> {
        // `and` / `or` short-circuit and yield one of their operands
        match op {
            BinaryOperator::And => {
                let left_val = self.eval_expression(left)?;
                if !left_val.is_truthy() {
                    return Ok(left_val);
                }
                return self.eval_expression(right);
            }
            BinaryOperator::Or => {
                let left_val = self.eval_expression(left)?;
                if left_val.is_truthy() {
                    return Ok(left_val);
                }
                return self.eval_expression(right);
            }
            _ => {}
        }

        let left_val = self.eval_expression(left)?;
        let right_val = self.eval_expression(right)?;

        match op {
            BinaryOperator::Add => self.eval_add(&left_val, &right_val),
            BinaryOperator::Subtract => self.eval_subtract(&left_val, &right_val),
            BinaryOperator::Multiply => self.eval_multiply(&left_val, &right_val),
            BinaryOperator::Divide => self.eval_divide(&left_val, &right_val),
            BinaryOperator::Power => self.eval_power(&left_val, &right_val),
            BinaryOperator::And | BinaryOperator::Or => {
                Err(EvalError::Syntax(format!("unexpected operator {}", op)))
            }
        }
    }

    fn numbers(&self, op: &str, left: &Value, right: &Value) -> EvalResult<(f64, f64)> {
        Ok((left.to_number(op)?, right.to_number(op)?))
    }

    fn eval_add(&self, left: &Value, right: &Value) -> EvalResult<Value> {
        let (l, r) = self.numbers("+", left, right)?;
        finite(l + r)
    }

    fn eval_subtract(&self, left: &Value, right: &Value) -> EvalResult<Value> {
        let (l, r) = self.numbers("-", left, right)?;
        finite(l - r)
    }

    fn eval_multiply(&self, left: &Value, right: &Value) -> EvalResult<Value> {
        let (l, r) = self.numbers("*", left, right)?;
        finite(l * r)
    }

    fn eval_divide(&self, left: &Value, right: &Value) -> EvalResult<Value> {
        let (l, r) = self.numbers("/", left, right)?;
        if r == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        finite(l / r)
    }

    fn eval_power(&self, left: &Value, right: &Value) -> EvalResult<Value> {
        let (l, r) = self.numbers("**", left, right)?;
        finite(power(l, r)?)
    }

    /// Every link of the chain must hold; each operand is evaluated at most
    /// once and evaluation stops at the first false link.
    fn eval_comparison(
        &self,
        first: &Expression,
        rest: &[(ComparisonOperator, Expression)],
    ) -> EvalResult<Value> {
        let mut left = self.eval_expression(first)?;
        for (op, operand) in rest {
            let right = self.eval_expression(operand)?;
            if !self.compare_values(*op, &left, &right)? {
                return Ok(Value::Boolean(false));
            }
            left = right;
        }
        Ok(Value::Boolean(true))
    }

    fn compare_values(
        &self,
        op: ComparisonOperator,
        left: &Value,
        right: &Value,
    ) -> EvalResult<bool> {
        let ordering = match (left, right) {
            (Value::Text(l), Value::Text(r)) => Some(l.cmp(r)),
            (Value::Text(_), _) | (_, Value::Text(_)) => None,
            _ => {
                let (l, r) = self.numbers(&op.to_string(), left, right)?;
                l.partial_cmp(&r)
            }
        };

        match (op, ordering) {
            (ComparisonOperator::Equal, ordering) => Ok(ordering == Some(Ordering::Equal)),
            (ComparisonOperator::NotEqual, ordering) => Ok(ordering != Some(Ordering::Equal)),
            (_, None) => Err(EvalError::TypeMismatch {
                operation: op.to_string(),
                found: format!("{} and {}", left.type_name(), right.type_name()),
            }),
            (ComparisonOperator::LessThan, Some(ordering)) => Ok(ordering.is_lt()),
            (ComparisonOperator::GreaterThan, Some(ordering)) => Ok(ordering.is_gt()),
            (ComparisonOperator::LessThanEqual, Some(ordering)) => Ok(ordering.is_le()),
            (ComparisonOperator::GreaterThanEqual, Some(ordering)) => Ok(ordering.is_ge()),
        }
    }

    fn eval_function_call(&self, function: &str, arguments: &[Expression]) -> EvalResult<Value> {
        let builtin = BuiltinFunction::lookup(function)?;
        let args = arguments
            .iter()
            .map(|arg| self.eval_expression(arg))
            .collect::<EvalResult<Vec<Value>>>()?;
        builtin.call(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::CompiledExpression;

    fn eval(source: &str, vars: &[(&str, Value)]) -> EvalResult<Value> {
        let variables: Variables = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        CompiledExpression::compile(source)?.evaluate(&variables)
    }

    fn number(source: &str) -> f64 {
        match eval(source, &[]).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(number("1 + 2 * 3"), 7.0);
        assert_eq!(number("(1 + 2) * 3"), 9.0);
        assert_eq!(number("10 - 4 - 3"), 3.0);
        assert_eq!(number("7 / 2"), 3.5);
        assert_eq!(number("2 ** 3 ** 2"), 512.0);
        assert_eq!(number("-2 ** 2"), -4.0);
        assert_eq!(number("2 ** -1"), 0.5);
        assert_eq!(number("--3"), 3.0);
        assert_eq!(number(".5 + 1e1"), 10.5);
    }

    #[test]
    fn test_booleans_in_arithmetic() {
        assert_eq!(number("True + True"), 2.0);
        assert_eq!(number("false * 3"), 0.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1 / 0", &[]), Err(EvalError::DivisionByZero));
        assert_eq!(
            eval("weight / (height - height)", &[
                ("weight", Value::Number(70.0)),
                ("height", Value::Number(1.75)),
            ]),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(eval("0 ** -1", &[]), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(eval("10 ** 400", &[]), Err(EvalError::NonFinite));
        assert_eq!(eval("(-8) ** 0.5", &[]), Err(EvalError::NonFinite));
    }

    #[test]
    fn test_undefined_variable() {
        let err = eval("weight / height", &[("weight", Value::Number(70.0))]).unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable("height".to_string()));
        assert_eq!(err.to_string(), "name 'height' is not defined");
    }

    #[test]
    fn test_chained_comparison() {
        let bmi = |n: f64| vec![("BMI", Value::Number(n))];
        assert_eq!(eval("0 <= BMI < 18.5", &bmi(17.0)), Ok(Value::Boolean(true)));
        assert_eq!(eval("0 <= BMI < 18.5", &bmi(18.5)), Ok(Value::Boolean(false)));
        assert_eq!(eval("0 <= BMI < 18.5", &bmi(-1.0)), Ok(Value::Boolean(false)));
        assert_eq!(eval("18.5 <= BMI < 25", &bmi(22.86)), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_chain_stops_at_first_false_link() {
        // the second link would fail on an undefined name
        assert_eq!(eval("1 > 2 > missing", &[]), Ok(Value::Boolean(false)));
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(eval("1 < 2 and 2 < 3", &[]), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 > 2 or 2 < 3", &[]), Ok(Value::Boolean(true)));
        assert_eq!(eval("not 1 > 2", &[]), Ok(Value::Boolean(true)));
        assert_eq!(eval("0 or 5", &[]), Ok(Value::Number(5.0)));
        assert_eq!(eval("0 and missing", &[]), Ok(Value::Number(0.0)));
    }

    #[test]
    fn test_text_values() {
        let vars = [("name", Value::from("male"))];
        assert_eq!(eval("name == 'male'", &vars), Ok(Value::Boolean(true)));
        assert_eq!(eval("name != \"female\"", &vars), Ok(Value::Boolean(true)));
        assert_eq!(eval("name == 1", &vars), Ok(Value::Boolean(false)));
        assert!(matches!(
            eval("name < 1", &vars),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            eval("name + 1", &vars),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(number("round(2.5)"), 2.0);
        assert_eq!(number("round(3.14159, 2)"), 3.14);
        assert_eq!(number("max(1, 2 * 3, 4)"), 6.0);
        assert!(matches!(
            eval("open(1)", &[]),
            Err(EvalError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_amr_formula() {
        let vars = [
            ("weight", Value::Number(70.0)),
            ("height", Value::Number(1.75)),
            ("age", Value::Number(30.0)),
            ("activity_level", Value::Number(1.2)),
        ];
        let result = eval(
            "round((66 + (13.7 * weight) + (500 * height) - (5.8 * age) ) *  activity_level)",
            &vars,
        );
        // (66 + 959 + 875 - 174) * 1.2 = 2071.2
        assert_eq!(result, Ok(Value::Number(2071.0)));
    }
}
