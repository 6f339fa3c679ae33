use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use super::FieldInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormsResponse {
    pub forms: Vec<FieldInfo>,
}

/// Submitted form data: field code name → value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionPayload(pub HashMap<String, serde_json::Value>);

pub use miasi_core::pipeline::{Advice, EquationResult, SubmissionOutcome, SubmissionStatus};
