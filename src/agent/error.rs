//! Agent error types.

use thiserror::Error;

/// Error type for agent loading operations.
#[derive(Debug, Error)]
pub enum AgentLoadError {
    /// No document exists for the requested agent name.
    #[error("agent '{0}' not found")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but violates a schema invariant.
    #[error("invalid field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },
}

impl AgentLoadError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AgentLoadError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
