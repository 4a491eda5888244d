//! Reconciler error types

use thiserror::Error;

/// Result type for reconciler operations
pub type ReplSetResult<T> = Result<T, ReplSetError>;

/// Reconciler-related errors
#[derive(Error, Debug)]
pub enum ReplSetError {
    /// Structured failure reported by the server for a command that reached it
    #[error("command failed: {code_name} ({code}): {message}")]
    Operation {
        code: i32,
        code_name: String,
        message: String,
    },

    /// Anything that kept the command from reaching the server
    #[error("transport error: {0}")]
    Transport(String),
}
