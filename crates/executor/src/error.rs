//! Executor error kinds.

use lpgsim_types::ConfigurationError;
use thiserror::Error;

/// A sink write failed. The executor retries a failed append once before
/// escalating with this error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The underlying writer failed.
    #[error("sink i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be encoded.
    #[error("sink encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Experiment-level errors.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The scenario failed validation before any replica started.
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    /// A sink append failed twice in a row.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
