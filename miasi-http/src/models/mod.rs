pub mod forms;
pub mod systems;

// Re-export all models for easier imports
pub use forms::*;
pub use systems::*;

use miasi_core::ErrorKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable message
    pub error: String,

    pub kind: ErrorKind,
}
