//! Domain errors
//!
//! Every mutator and analytics call returns `Result<T, CoreError>`. A
//! `Validation` or `NotFound` error is raised before anything is written.

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by store operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Operation on an id that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Serialization, quota or I/O failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Third-party service or network failure
    #[error("External service failed: {0}")]
    ExternalService(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Short machine-readable kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::NotFound { .. } => "not_found",
            CoreError::Storage(e) if e.is_quota_exceeded() => "quota_exceeded",
            CoreError::Storage(_) => "storage",
            CoreError::ExternalService(_) => "external_service",
        }
    }

    /// The tagged `{success: false, error}` form handed to presentation code
    pub fn to_failure(&self) -> Failure {
        Failure {
            success: false,
            kind: self.kind(),
            error: self.to_string(),
        }
    }
}

/// Serialized failure result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Failure {
    pub success: bool,
    pub kind: &'static str,
    pub error: String,
}

/// Result type for store operations
pub type CoreResult<T> = Result<T, CoreError>;
