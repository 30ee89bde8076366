//! # Engine Error Types
//!
//! Error taxonomy for job submission and processing. Validation, decode,
//! busy, and not-initialized failures are reported before a job runs;
//! divergence aborts a running job; cancellation is a terminal status, not an
//! error, and never carries an error payload.

use core_codec::CodecError;
use core_filter::FilterError;
use thiserror::Error;

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine context has not received `Init` yet.
    #[error("Engine not initialized")]
    NotInitialized,

    /// A job is already running; the engine has a single concurrency slot.
    #[error("A job is already running")]
    Busy,

    /// Settings were rejected before any job was created.
    #[error("Validation error: {0}")]
    Validation(FilterError),

    /// Input bytes could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] CodecError),

    /// Numerical instability detected mid-stream; the job was aborted.
    #[error("Adaptive filter diverged during processing")]
    Divergence,

    /// A job was driven through an illegal lifecycle transition.
    #[error("Invalid job state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// The engine context is gone; its channels are closed.
    #[error("Engine channel closed")]
    ChannelClosed,

    /// Engine configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FilterError> for EngineError {
    fn from(e: FilterError) -> Self {
        match e {
            FilterError::Divergence => EngineError::Divergence,
            other => EngineError::Validation(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
