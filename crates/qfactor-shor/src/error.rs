//! Error types for the factoring core.

use qfactor_hal::HalError;
use qfactor_ir::IrError;
use thiserror::Error;

/// Errors raised while building or running the factoring circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShorError {
    /// The base has no modulus-15 multiplication circuit.
    #[error("Invalid base {base}: 'a' must be 2, 4, 7, 8, 11 or 13")]
    InvalidBase {
        /// The rejected base.
        base: u64,
    },

    /// Counting register width out of range.
    #[error("Invalid counting register width: {0}")]
    InvalidQubitCount(u32),

    /// Modulus the search loop cannot work with.
    #[error("Invalid modulus: {0}")]
    InvalidModulus(u64),

    /// The backend returned no per-shot memory.
    #[error("Backend returned no measurement memory")]
    MissingMemory,

    /// A measured bitstring that is not a counting register reading.
    #[error("Invalid register reading: {0}")]
    InvalidReading(String),

    /// Circuit construction failed.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Backend failure.
    #[error("Backend error: {0}")]
    Hal(#[from] HalError),

    /// The attempt transcript could not be written.
    #[error("Transcript output failed: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for factoring operations.
pub type ShorResult<T> = Result<T, ShorError>;
