use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::catalog::{CatalogError, SystemId};
use crate::eval::EvalError;

/// Coarse classification used by the outer layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown system, or no equation applies to the submission
    NotFound,
    /// The submitted data is incomplete or malformed
    Validation,
    /// A formula, condition or rule authored by an administrator is defective
    Evaluation,
    /// The catalog could not be read
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotFoundError {
    #[error("System not found")]
    System(SystemId),
    #[error("No equations found for this system")]
    NoEquations,
    #[error("No equations match the provided sex")]
    NoMatchingSex(Option<i64>),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Error parsing input data: {0}")]
    MalformedPayload(String),
    #[error("No data provided")]
    NoData,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Value for field {field} does not match its validation rule")]
    RuleMismatch { field: String },
}

impl ValidationError {
    /// Field names this error is about, in reporting order.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::MissingFields(fields) => fields.iter().map(String::as_str).collect(),
            ValidationError::InvalidValue { field, .. } | ValidationError::RuleMismatch { field } => {
                vec![field.as_str()]
            }
            ValidationError::MalformedPayload(_) | ValidationError::NoData => Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error calculating equation {equation}: {source}")]
    Formula {
        equation: String,
        #[source]
        source: EvalError,
    },

    #[error("Error evaluating knowledge condition for {condition}: {source}")]
    Condition {
        condition: String,
        #[source]
        source: EvalError,
    },

    #[error("Invalid validation rule for field {field}: {message}")]
    InvalidRule { field: String, message: String },

    #[error("Catalog error: {0}")]
    Catalog(CatalogError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::SystemNotFound(id) => Error::NotFound(NotFoundError::System(id)),
            other => Error::Catalog(other),
        }
    }
}

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }

    pub fn formula(equation: impl Into<String>, source: EvalError) -> Self {
        Error::Formula {
            equation: equation.into(),
            source,
        }
    }

    pub fn condition(condition: impl Into<String>, source: EvalError) -> Self {
        Error::Condition {
            condition: condition.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Formula { .. } | Error::Condition { .. } | Error::InvalidRule { .. } => {
                ErrorKind::Evaluation
            }
            Error::Catalog(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }
}
