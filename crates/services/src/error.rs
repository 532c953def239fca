//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::scheduler::SchedulerError;

/// Errors emitted by practice sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
