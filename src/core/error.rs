use thiserror::Error;
use uuid::Uuid;
use crate::models::DecisionKind;
use crate::services::StorageError;

/// Errors surfaced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate decision: {actor_id} already decided on {target_id} ({kind})")]
    DuplicateDecision {
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),
}

impl EngineError {
    /// HTTP status code the error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidInput(_) => 400,
            EngineError::DuplicateDecision { .. } => 409,
            EngineError::NotFound(_) => 404,
            EngineError::StorageFailure(_) => 500,
        }
    }

    /// Whether the caller may safely repeat the request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StorageFailure(_))
    }

    /// Short machine-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::DuplicateDecision { .. } => "duplicate_decision",
            EngineError::NotFound(_) => "not_found",
            EngineError::StorageFailure(_) => "storage_failure",
        }
    }
}
