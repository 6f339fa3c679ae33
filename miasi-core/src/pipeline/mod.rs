//! # Submission pipeline
//!
//! ```text
//! payload → coercion → equation selection → equation evaluation
//!         → knowledge resolution → SubmissionOutcome
//! ```
//!
//! [`evaluate_submission`] is the synchronous core: it works on a
//! [`SystemDefinition`] that was read from the catalog beforehand.
//! [`SubmissionService`] does the catalog reads and logging around it.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::config::EngineConfig;
use crate::error::{InternalResult, NotFoundError, ValidationError};

pub mod coercion;
pub mod equations;
pub mod knowledge;
pub mod submission;

pub use crate::catalog::SystemDefinition;
pub use coercion::RawSubmission;
pub use equations::EquationResult;
pub use knowledge::Advice;
pub use submission::SubmissionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    ComputedWithAdvice,
    ComputedWithoutAdvice,
}

impl SubmissionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionStatus::ComputedWithAdvice => "Equations calculated successfully with advice",
            SubmissionStatus::ComputedWithoutAdvice => {
                "Equations calculated successfully, but no advice available"
            }
        }
    }
}

/// Successful answer to a form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub message: String,
    /// Non-internal equation results, in evaluation order
    pub results: Vec<EquationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
}

impl SubmissionOutcome {
    pub fn new(results: Vec<EquationResult>, advice: Option<Advice>) -> Self {
        let status = if advice.is_some() {
            SubmissionStatus::ComputedWithAdvice
        } else {
            SubmissionStatus::ComputedWithoutAdvice
        };
        Self {
            status,
            message: status.message().to_string(),
            results,
            advice,
        }
    }
}

/// Runs a submission against an already loaded system definition.
///
/// Checks happen in a fixed order: a system without equations is reported
/// before anything about the payload, then an empty payload, then missing
/// fields, then per-field coercion, equation selection and evaluation.
#[tracing::instrument(level = "debug", skip_all, fields(system_id = definition.system.id))]
pub fn evaluate_submission(
    definition: &SystemDefinition,
    payload: &JsonValue,
    config: &EngineConfig,
) -> InternalResult<SubmissionOutcome> {
    if definition.equations.is_empty() {
        return Err(NotFoundError::NoEquations.into());
    }

    let raw = match payload {
        JsonValue::Object(map) if !map.is_empty() => map,
        _ => return Err(ValidationError::NoData.into()),
    };

    let mut variables = coercion::coerce_fields(raw, &definition.fields)?;
    let sex = equations::resolve_sex(&definition.fields, &variables);
    let selected = equations::select_equations(&definition.equations, sex)?;
    let results = equations::calculate_results(&selected, &mut variables, config)?;

    let advice = knowledge::evaluate_knowledge(
        &definition.knowledge,
        definition.system.multi_advice,
        &variables,
        config,
    )?;

    Ok(SubmissionOutcome::new(results, advice))
}
