//! Field coercion: raw submitted JSON values → typed [`Value`]s, driven by
//! the declared [`InputKind`] of each required field.

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::catalog::{FormField, InputKind};
use crate::error::{Error, InternalResult, ValidationError};
use crate::eval::{Value, Variables};

/// Submitted form data: field code name → raw JSON value.
pub type RawSubmission = serde_json::Map<String, JsonValue>;

/// Reports every required field absent from `raw`, in required order.
pub fn check_required(raw: &RawSubmission, fields: &[FormField]) -> Result<(), ValidationError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| !raw.contains_key(&field.name))
        .map(|field| field.name.clone())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// Coerces every required field. Submitted keys that are not required
/// fields are ignored.
#[tracing::instrument(level = "debug", skip_all, fields(fields = fields.len()))]
pub fn coerce_fields(raw: &RawSubmission, fields: &[FormField]) -> InternalResult<Variables> {
    check_required(raw, fields)?;

    let mut variables = Variables::with_capacity(fields.len());
    for field in fields {
        let Some(value) = raw.get(&field.name) else {
            continue;
        };
        let coerced = coerce_value(field, value)?;
        tracing::debug!(field = %field.name, value = %coerced, "coerced");
        variables.insert(field.name.clone(), coerced);
    }
    Ok(variables)
}

/// Coerces one submitted value according to `field`.
///
/// The validation rule, if any, is checked first against the trimmed
/// textual form of the value.
pub fn coerce_value(field: &FormField, raw: &JsonValue) -> InternalResult<Value> {
    if let Some(rule) = &field.validation_rule {
        check_rule(field, rule, raw)?;
    }

    let value = match field.input_kind {
        InputKind::Number => coerce_number(field, raw)?,
        InputKind::Sex => coerce_sex(field, raw)?,
        InputKind::Select => coerce_select(field, raw)?,
        InputKind::Text => match text_form(raw) {
            Some(text) => Value::Text(text),
            None => return Err(invalid(field, "expected text").into()),
        },
    };
    Ok(value)
}

fn check_rule(field: &FormField, rule: &str, raw: &JsonValue) -> InternalResult<()> {
    let regex = Regex::new(rule).map_err(|e| Error::InvalidRule {
        field: field.name.clone(),
        message: e.to_string(),
    })?;
    match text_form(raw) {
        Some(text) if regex.is_match(&text) => Ok(()),
        _ => Err(ValidationError::RuleMismatch {
            field: field.name.clone(),
        }
        .into()),
    }
}

fn coerce_number(field: &FormField, raw: &JsonValue) -> Result<Value, ValidationError> {
    let number = match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(Value::Number(n)),
        _ => Err(invalid(field, "expected a number")),
    }
}

fn coerce_sex(field: &FormField, raw: &JsonValue) -> Result<Value, ValidationError> {
    let sex = match raw {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    sex.map(Value::from)
        .ok_or_else(|| invalid(field, "expected an integer"))
}

fn coerce_select(field: &FormField, raw: &JsonValue) -> Result<Value, ValidationError> {
    let submitted = match raw {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return Err(invalid(field, "expected one of the listed options")),
    };
    let submitted_number = submitted.parse::<f64>().ok();

    let matched = field.select_values.iter().find(|option| {
        let option = option.trim();
        option == submitted
            || matches!(
                (option.parse::<f64>().ok(), submitted_number),
                (Some(a), Some(b)) if a == b
            )
    });

    match matched {
        Some(option) => Ok(match option.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(option.trim().to_string()),
        }),
        None => Err(invalid(
            field,
            &format!("'{}' is not one of the listed options", submitted),
        )),
    }
}

/// Trimmed text of a scalar JSON value.
fn text_form(raw: &JsonValue) -> Option<String> {
    match raw {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn invalid(field: &FormField, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.name.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample::sample_catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field(name: &str, input_kind: InputKind) -> FormField {
        FormField {
            id: 1,
            name: name.to_string(),
            display_name: name.to_string(),
            input_kind,
            description: None,
            order: None,
            validation_rule: None,
            select_labels: Vec::new(),
            select_values: Vec::new(),
        }
    }

    fn raw(value: JsonValue) -> RawSubmission {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        let fields = sample_catalog().required_fields(2);
        let err = check_required(&raw(json!({"weight": 70})), &fields).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "height".to_string(),
                "age".to_string(),
                "sex".to_string()
            ])
        );
        assert_eq!(err.to_string(), "Missing required fields: height, age, sex");
    }

    #[test]
    fn test_coerce_bmi_inputs() {
        let fields = sample_catalog().required_fields(1);
        let variables = coerce_fields(
            &raw(json!({"height": "1.75", "weight": 70, "extra": "ignored"})),
            &fields,
        )
        .unwrap();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables["height"], Value::Number(1.75));
        assert_eq!(variables["weight"], Value::Number(70.0));
    }

    #[test]
    fn test_number_rejects_text() {
        let number = field("weight", InputKind::Number);
        for bad in [json!("heavy"), json!(true), json!(null), json!("inf")] {
            let err = coerce_value(&number, &bad).unwrap_err();
            assert!(
                matches!(&err, Error::Validation(ValidationError::InvalidValue { field, .. }) if field == "weight"),
                "{:?} should be rejected",
                bad
            );
        }
        assert_eq!(
            coerce_value(&number, &json!(" 2.5 ")).unwrap(),
            Value::Number(2.5)
        );
    }

    #[test]
    fn test_sex_is_an_integer() {
        let sex = field("sex", InputKind::Sex);
        assert_eq!(coerce_value(&sex, &json!(1)).unwrap(), Value::Number(1.0));
        assert_eq!(coerce_value(&sex, &json!(0.0)).unwrap(), Value::Number(0.0));
        assert_eq!(coerce_value(&sex, &json!(" 0 ")).unwrap(), Value::Number(0.0));
        assert!(coerce_value(&sex, &json!(0.5)).is_err());
        assert!(coerce_value(&sex, &json!("male")).is_err());
    }

    #[test]
    fn test_select_membership() {
        let catalog = sample_catalog();
        let activity = catalog
            .fields
            .iter()
            .find(|f| f.name == "activity_level")
            .unwrap();

        assert_eq!(
            coerce_value(activity, &json!(" 1.2 ")).unwrap(),
            Value::Number(1.2)
        );
        assert_eq!(coerce_value(activity, &json!(1.6)).unwrap(), Value::Number(1.6));
        assert_eq!(coerce_value(activity, &json!(1)).unwrap(), Value::Number(1.0));

        let err = coerce_value(activity, &json!("2.5")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for field activity_level: '2.5' is not one of the listed options"
        );
    }

    #[test]
    fn test_select_keeps_text_options() {
        let mut colour = field("colour", InputKind::Select);
        colour.select_labels = vec!["Red".to_string(), "Blue".to_string()];
        colour.select_values = vec!["red".to_string(), "blue".to_string()];
        assert_eq!(
            coerce_value(&colour, &json!("blue")).unwrap(),
            Value::Text("blue".to_string())
        );
        assert!(coerce_value(&colour, &json!("green")).is_err());
    }

    #[test]
    fn test_text_is_trimmed() {
        let name = field("name", InputKind::Text);
        assert_eq!(
            coerce_value(&name, &json!("  Ann ")).unwrap(),
            Value::Text("Ann".to_string())
        );
        assert_eq!(
            coerce_value(&name, &json!(12)).unwrap(),
            Value::Text("12".to_string())
        );
        assert!(coerce_value(&name, &json!(["a"])).is_err());
    }

    #[test]
    fn test_validation_rule() {
        let catalog = sample_catalog();
        let height = catalog.fields.iter().find(|f| f.name == "height").unwrap();
        assert!(coerce_value(height, &json!("1.75")).is_ok());

        let err = coerce_value(height, &json!("-1.75")).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::RuleMismatch { ref field }) if field == "height"
        ));
    }

    #[test]
    fn test_broken_rule_is_an_authoring_defect() {
        let mut age = field("age", InputKind::Number);
        age.validation_rule = Some("([0-9".to_string());
        let err = coerce_value(&age, &json!(30)).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Evaluation);
    }
}
