//! Static checks over a [`Catalog`], catching authoring defects before a
//! user submission runs into them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::catalog::{Catalog, FormField, InputKind, SystemId};
use crate::config::EngineConfig;
use crate::eval::{functions::BuiltinFunction, CompiledExpression};
use crate::preprocessor::{ConditionSplitter, Preprocessor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LintIssue {
    pub system: SystemId,
    /// What the issue is about, e.g. `equation BMI` or `field activity_level`
    pub location: String,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system {}: {}: {}", self.system, self.location, self.message)
    }
}

/// Lints every system of `catalog`.
///
/// Formulas may reference required fields and earlier equations; knowledge
/// conditions may reference required fields and any equation of the system.
pub fn lint_catalog(catalog: &Catalog, config: &EngineConfig) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for link in &catalog.links {
        if catalog.system(link.system_id).is_err() {
            issues.push(LintIssue {
                system: link.system_id,
                location: "link".to_string(),
                message: "links an unknown system".to_string(),
            });
        }
        if !catalog.fields.iter().any(|f| f.id == link.field_id) {
            issues.push(LintIssue {
                system: link.system_id,
                location: "link".to_string(),
                message: format!("links unknown field {}", link.field_id),
            });
        }
    }

    for system in &catalog.systems {
        let mut report = |location: String, message: String| {
            issues.push(LintIssue {
                system: system.id,
                location,
                message,
            })
        };

        let fields = catalog.required_fields(system.id);
        let mut known: Vec<String> = Vec::new();
        for field in &fields {
            if known.contains(&field.name) {
                report(format!("field {}", field.name), "is required twice".to_string());
            }
            known.push(field.name.clone());
            for message in lint_field(field) {
                report(format!("field {}", field.name), message);
            }
        }

        let equations = catalog.equations(system.id);
        for equation in &equations {
            let location = format!("equation {}", equation.name);
            for message in lint_expression(&equation.formula, &known, config) {
                report(location.clone(), message);
            }
            if !known.contains(&equation.name) {
                known.push(equation.name.clone());
            }
        }

        let splitter = ConditionSplitter::new(config.condition_delimiter.as_str());
        for entry in catalog.knowledge(system.id) {
            let location = format!("knowledge {}", entry.id);
            for condition in splitter.process(entry.condition.as_str()) {
                for message in lint_expression(condition, &known, config) {
                    report(location.clone(), format!("`{}`: {}", condition, message));
                }
            }
        }
    }

    issues
}

fn lint_field(field: &FormField) -> Vec<String> {
    let mut messages = Vec::new();
    if let Some(rule) = &field.validation_rule {
        if let Err(e) = Regex::new(rule) {
            messages.push(format!("invalid validation rule: {}", e));
        }
    }
    if field.input_kind == InputKind::Select {
        if field.select_values.is_empty() {
            messages.push("select field has no options".to_string());
        }
        if field.select_labels.len() != field.select_values.len() {
            messages.push(format!(
                "{} labels but {} values",
                field.select_labels.len(),
                field.select_values.len()
            ));
        }
    }
    messages
}

fn lint_expression(source: &str, known: &[String], config: &EngineConfig) -> Vec<String> {
    let expression = match CompiledExpression::compile_with_limit(source, config.max_expression_depth) {
        Ok(expression) => expression,
        Err(e) => return vec![e.to_string()],
    };

    let mut messages: Vec<String> = expression
        .variables()
        .into_iter()
        .filter(|name| !known.contains(name))
        .map(|name| format!("name '{}' is not defined", name))
        .collect();
    messages.extend(
        expression
            .ast()
            .functions()
            .iter()
            .filter_map(|name| BuiltinFunction::lookup(name).err())
            .map(|e| e.to_string()),
    );
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{sample::sample_catalog, Equation, Knowledge};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_catalog_is_clean() {
        assert_eq!(lint_catalog(&sample_catalog(), &EngineConfig::default()), Vec::new());
    }

    #[test]
    fn test_reports_authoring_defects() {
        let mut catalog = sample_catalog();
        catalog.equations.push(Equation {
            id: 10,
            system_id: 1,
            name: "Broken".to_string(),
            display_name: "Broken".to_string(),
            formula: "weight / / 2".to_string(),
            sex: None,
            is_internal: false,
            description: None,
        });
        catalog.equations.push(Equation {
            id: 11,
            system_id: 1,
            name: "Later".to_string(),
            display_name: "Later".to_string(),
            formula: "eval(weight) + Future + BMI".to_string(),
            sex: None,
            is_internal: false,
            description: None,
        });
        catalog.knowledge.push(Knowledge {
            id: 20,
            system_id: 1,
            condition: "BMI > 40 and waist > 100".to_string(),
            advice: "x".to_string(),
        });

        let issues = lint_catalog(&catalog, &EngineConfig::default());
        let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "system 1: equation Broken: invalid syntax: unexpected '/' at line 1, column 10",
                "system 1: equation Later: name 'Future' is not defined",
                "system 1: equation Later: function 'eval' is not allowed",
                "system 1: knowledge 20: `waist > 100`: name 'waist' is not defined",
            ]
        );
    }

    #[test]
    fn test_select_and_rule_defects() {
        let mut catalog = sample_catalog();
        let activity = catalog
            .fields
            .iter_mut()
            .find(|f| f.name == "activity_level")
            .unwrap();
        activity.select_labels.pop();
        activity.validation_rule = Some("(".to_string());

        let issues = lint_catalog(&catalog, &EngineConfig::default());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.system == 3 && i.location == "field activity_level"));
        assert_eq!(issues[1].message, "4 labels but 5 values");
    }
}
