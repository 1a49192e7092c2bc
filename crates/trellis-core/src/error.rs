//! Error types for Trellis core systems.

use thiserror::Error;

/// Errors produced by the task scheduler and the animation channels built
/// on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The task ID is invalid or the task has already finished.
    #[error("invalid or expired task ID")]
    InvalidTaskId,
}

/// A specialized Result type for Trellis core operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
