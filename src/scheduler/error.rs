//! Scheduler error types.

use thiserror::Error;

use crate::llm::LlmError;
use crate::social::SocialError;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The agent has no tasks, so nothing can be selected.
    #[error("agent has no tasks to schedule")]
    EmptyTaskSet,

    /// The agent configures no LLM provider connection.
    #[error("no llm provider connection is configured")]
    NoLlmProvider,

    /// An LLM call failed during a tick.
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    /// A social platform call failed during a tick.
    #[error("social call failed: {0}")]
    Social(#[from] SocialError),
}
