//! Functions callable from formulas and conditions.
//!
//! This is a closed allow-list: a call to any other name fails with
//! [`EvalError::UnknownFunction`] and nothing outside the variable mapping
//! is reachable.

use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{EvalError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinFunction {
    /// `round(x)` or `round(x, digits)`, ties to even
    Round,
    Abs,
    /// `min(a, b, ...)`
    Min,
    /// `max(a, b, ...)`
    Max,
    Pow,
    Sqrt,
}

impl BuiltinFunction {
    pub fn lookup(name: &str) -> Result<Self, EvalError> {
        Self::from_str(name).map_err(|_| EvalError::UnknownFunction(name.to_string()))
    }

    fn check_arity(&self, found: usize) -> Result<(), EvalError> {
        let (min, max, expected) = match self {
            BuiltinFunction::Round => (1, 2, "1 or 2"),
            BuiltinFunction::Abs | BuiltinFunction::Sqrt => (1, 1, "1"),
            BuiltinFunction::Pow => (2, 2, "2"),
            BuiltinFunction::Min | BuiltinFunction::Max => (2, usize::MAX, "at least 2"),
        };
        if found < min || found > max {
            return Err(EvalError::Arity {
                function: self.to_string(),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(args))]
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self.check_arity(args.len())?;
        let name = self.as_ref();
        let numbers = args
            .iter()
            .map(|arg| arg.to_number(name))
            .collect::<Result<Vec<f64>, EvalError>>()?;

        let result = match self {
            BuiltinFunction::Round => {
                let digits = match numbers.get(1) {
                    Some(d) if d.fract() != 0.0 => {
                        return Err(EvalError::TypeMismatch {
                            operation: "round digits".to_string(),
                            found: "non-integer number".to_string(),
                        });
                    }
                    Some(d) => *d as i32,
                    None => 0,
                };
                round_to(numbers[0], digits)
            }
            BuiltinFunction::Abs => numbers[0].abs(),
            BuiltinFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
            BuiltinFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            BuiltinFunction::Pow => power(numbers[0], numbers[1])?,
            BuiltinFunction::Sqrt => numbers[0].sqrt(),
        };
        finite(result)
    }
}

/// Round half to even at `digits` decimal places; negative `digits` round
/// to tens, hundreds and so on.
///
/// Positive `digits` round the exact binary value through decimal
/// formatting, so `round_to(2.675, 2)` is `2.67`.
pub fn round_to(x: f64, digits: i32) -> f64 {
    if !x.is_finite() || digits > 15 {
        return x;
    }
    if digits < -308 {
        return 0.0;
    }
    if digits == 0 {
        return x.round_ties_even();
    }
    if digits > 0 {
        // Beyond 2^53 there are no fractional digits left to round
        if x.abs() >= MAX_EXACT_INTEGER {
            return x;
        }
        return format!("{:.*}", digits as usize, x).parse().unwrap_or(x);
    }
    let factor = 10f64.powi(-digits);
    let rounded = (x / factor).round_ties_even() * factor;
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `x ** y`; a zero base with a negative exponent is a division by zero.
pub(crate) fn power(x: f64, y: f64) -> Result<f64, EvalError> {
    if x == 0.0 && y < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(x.powf(y))
}

pub(crate) fn finite(n: f64) -> Result<Value, EvalError> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EvalError::NonFinite)
    }
}
