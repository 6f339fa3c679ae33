pub mod forms;
pub mod systems;

// Re-export all handlers for easier imports
pub use forms::*;
pub use systems::*;

use crate::error::AppError;
use miasi_core::catalog::SystemId;

/// Parses a system id path segment; anything that is not an integer names
/// no system.
pub(crate) fn parse_system_id(raw: &str) -> Result<SystemId, AppError> {
    raw.parse::<SystemId>()
        .map_err(|_| AppError::UnknownPath(raw.to_string()))
}
