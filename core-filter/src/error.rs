//! # Filter Error Types

use thiserror::Error;

/// Errors produced by settings validation and the adaptive filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Filter length is outside the allowed range or misaligned.
    #[error("Invalid filter length: {0} (must be a multiple of 128 in [128, 2048])")]
    InvalidFilterLength(usize),

    /// Step size is outside the allowed range.
    #[error("Invalid step size: {0} (must be in (0.0, 0.2])")]
    InvalidStepSize(f32),

    /// Numerical instability: a coefficient or output grew unbounded or
    /// became non-finite. The filter stops updating; the job must terminate.
    #[error("Adaptive filter diverged")]
    Divergence,
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
