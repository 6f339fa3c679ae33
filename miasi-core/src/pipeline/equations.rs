//! Equation selection and evaluation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{Equation, FormField, InputKind};
use crate::config::EngineConfig;
use crate::error::{Error, InternalResult, NotFoundError};
use crate::eval::{functions::round_to, CompiledExpression, Value, Variables};

/// A reported (non-internal) equation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquationResult {
    /// Display name of the equation
    pub equation_name: String,
    /// Rounded to the configured display precision
    pub result: f64,
}

/// The coerced value of the first `sex` field, if the system has one.
pub fn resolve_sex(fields: &[FormField], variables: &Variables) -> Option<i64> {
    let field = fields.iter().find(|f| f.input_kind == InputKind::Sex)?;
    match variables.get(&field.name)? {
        Value::Number(n) => Some(*n as i64),
        _ => None,
    }
}

/// Equations applicable to `sex`, in catalog order.
pub fn select_equations(equations: &[Equation], sex: Option<i64>) -> InternalResult<Vec<&Equation>> {
    if equations.is_empty() {
        return Err(NotFoundError::NoEquations.into());
    }
    let selected: Vec<&Equation> = equations
        .iter()
        .filter(|equation| equation.sex.is_none() || equation.sex == sex)
        .collect();
    if selected.is_empty() {
        return Err(NotFoundError::NoMatchingSex(sex).into());
    }
    Ok(selected)
}

/// Evaluates `equations` in order.
///
/// Each result is stored in `variables` under the equation's code name at
/// full precision, so later equations and knowledge conditions can read it.
/// Only non-internal results are returned, rounded for display.
#[tracing::instrument(level = "debug", skip_all, fields(equations = equations.len()))]
pub fn calculate_results(
    equations: &[&Equation],
    variables: &mut Variables,
    config: &EngineConfig,
) -> InternalResult<Vec<EquationResult>> {
    let mut results = Vec::new();
    for equation in equations {
        let result = CompiledExpression::compile_with_limit(
            &equation.formula,
            config.max_expression_depth,
        )
        .and_then(|formula| formula.evaluate_number(variables))
        .map_err(|e| Error::formula(&equation.display_name, e))?;

        tracing::debug!(equation = %equation.name, result, "calculated");
        variables.insert(equation.name.clone(), Value::Number(result));

        if !equation.is_internal {
            results.push(EquationResult {
                equation_name: equation.display_name.clone(),
                result: round_to(result, config.display_precision as i32),
            });
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample::sample_catalog;
    use crate::eval::EvalError;
    use pretty_assertions::assert_eq;

    fn equation(id: i64, name: &str, formula: &str, sex: Option<i64>, internal: bool) -> Equation {
        Equation {
            id,
            system_id: 1,
            name: name.to_string(),
            display_name: format!("{} display", name),
            formula: formula.to_string(),
            sex,
            is_internal: internal,
            description: None,
        }
    }

    fn vars(pairs: &[(&str, f64)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Number(*v)))
            .collect()
    }

    #[test]
    fn test_bmi_is_rounded_for_display_only() {
        let catalog = sample_catalog();
        let equations = catalog.equations(1);
        let selected = select_equations(&equations, None).unwrap();
        let mut variables = vars(&[("height", 1.75), ("weight", 70.0)]);

        let results = calculate_results(&selected, &mut variables, &EngineConfig::default()).unwrap();
        assert_eq!(
            results,
            vec![EquationResult {
                equation_name: "Body Mass Index".to_string(),
                result: 22.86
            }]
        );
        let Value::Number(full) = variables["BMI"] else {
            panic!("BMI should be a number");
        };
        assert!((full - 22.857142857142858).abs() < 1e-12);
    }

    #[test]
    fn test_sex_filter() {
        let catalog = sample_catalog();
        let equations = catalog.equations(2);

        let male: Vec<&str> = select_equations(&equations, Some(1))
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(male, vec!["BMR_Male"]);

        let err = select_equations(&equations, Some(2)).unwrap_err();
        assert_eq!(err.to_string(), "No equations match the provided sex");

        let err = select_equations(&equations, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::NoMatchingSex(None))));
    }

    #[test]
    fn test_unrestricted_equations_always_apply() {
        let equations = vec![
            equation(1, "a", "1", None, false),
            equation(2, "b", "2", Some(0), false),
        ];
        assert_eq!(select_equations(&equations, Some(1)).unwrap().len(), 1);
        assert_eq!(select_equations(&equations, Some(0)).unwrap().len(), 2);
    }

    #[test]
    fn test_no_equations() {
        let err = select_equations(&[], Some(1)).unwrap_err();
        assert_eq!(err.to_string(), "No equations found for this system");
    }

    #[test]
    fn test_internal_results_feed_later_equations() {
        let equations = vec![
            equation(1, "double", "x * 2", None, true),
            equation(2, "quad", "double * 2", None, false),
        ];
        let selected: Vec<&Equation> = equations.iter().collect();
        let mut variables = vars(&[("x", 1.005)]);
        let results = calculate_results(&selected, &mut variables, &EngineConfig::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].equation_name, "quad display");
        assert_eq!(results[0].result, 4.02);
        assert!(variables.contains_key("double"));
    }

    #[test]
    fn test_huge_result_survives_display_rounding() {
        let equations = vec![equation(1, "huge", "weight * 1e305", None, false)];
        let selected: Vec<&Equation> = equations.iter().collect();
        let mut variables = vars(&[("weight", 100.0)]);
        let results = calculate_results(&selected, &mut variables, &EngineConfig::default()).unwrap();

        assert!(results[0].result.is_finite());
        assert_eq!(results[0].result, 100.0 * 1e305);
        assert_eq!(
            serde_json::to_value(&results[0]).unwrap()["result"],
            serde_json::json!(100.0 * 1e305)
        );
    }

    #[test]
    fn test_formula_error_names_the_equation() {
        let equations = vec![equation(1, "ratio", "x / y", None, false)];
        let selected: Vec<&Equation> = equations.iter().collect();
        let mut variables = vars(&[("x", 1.0), ("y", 0.0)]);
        let err = calculate_results(&selected, &mut variables, &EngineConfig::default()).unwrap_err();
        assert!(matches!(
            &err,
            Error::Formula { equation, source: EvalError::DivisionByZero } if equation == "ratio display"
        ));
        assert_eq!(
            err.to_string(),
            "Error calculating equation ratio display: division by zero"
        );
    }

    #[test]
    fn test_resolve_sex() {
        let catalog = sample_catalog();
        let fields = catalog.required_fields(2);
        let mut variables = vars(&[("sex", 0.0)]);
        assert_eq!(resolve_sex(&fields, &variables), Some(0));

        variables.remove("sex");
        assert_eq!(resolve_sex(&fields, &variables), None);
        assert_eq!(resolve_sex(&catalog.required_fields(1), &vars(&[("sex", 1.0)])), None);
    }
}
