//! Error types for the backend layer.

use thiserror::Error;

/// Errors raised by a backend or by the job lifecycle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The simulation itself failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled before it produced a result.
    #[error("Job cancelled")]
    JobCancelled,

    /// No job with this id was submitted to the backend.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The circuit cannot be simulated as written.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// A `BackendConfig` entry is missing, mistyped or out of range.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `wait` gave up before the job reached a terminal state.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// More qubits than the backend can hold.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Shot count outside `1..=max_shots`.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Anything else reported by a simulator.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for backend operations.
pub type HalResult<T> = Result<T, HalError>;
