//! # Processing Settings
//!
//! Validated adaptation parameters for one processing job. Settings are
//! checked before any job is created; the engine never runs with values
//! outside the allowed ranges.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};

/// Smallest allowed filter length.
pub const FILTER_LENGTH_MIN: usize = 128;
/// Largest allowed filter length.
pub const FILTER_LENGTH_MAX: usize = 2048;
/// Filter lengths must be multiples of this step.
pub const FILTER_LENGTH_STEP: usize = 128;
/// Largest allowed adaptation step size.
pub const STEP_SIZE_MAX: f32 = 0.2;

/// Adaptation parameters for the filter core.
///
/// The regularization epsilon is fixed internally
/// ([`crate::nlms::REGULARIZATION_EPSILON`]) and is not host-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Number of past samples used to predict the current sample.
    pub filter_length: usize,
    /// Adaptation rate; higher values converge faster but less stably.
    pub step_size: f32,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            filter_length: 1024,
            step_size: 0.05,
        }
    }
}

impl ProcessingSettings {
    /// Create validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidFilterLength`] or
    /// [`FilterError::InvalidStepSize`] when a value is out of range.
    pub fn new(filter_length: usize, step_size: f32) -> Result<Self> {
        let settings = Self {
            filter_length,
            step_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Set the filter length (validated at submission).
    pub fn with_filter_length(mut self, filter_length: usize) -> Self {
        self.filter_length = filter_length;
        self
    }

    /// Set the step size (validated at submission).
    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = step_size;
        self
    }

    /// Validate ranges and alignment.
    pub fn validate(&self) -> Result<()> {
        if self.filter_length < FILTER_LENGTH_MIN
            || self.filter_length > FILTER_LENGTH_MAX
            || self.filter_length % FILTER_LENGTH_STEP != 0
        {
            return Err(FilterError::InvalidFilterLength(self.filter_length));
        }

        if !self.step_size.is_finite() || self.step_size <= 0.0 || self.step_size > STEP_SIZE_MAX {
            return Err(FilterError::InvalidStepSize(self.step_size));
        }

        Ok(())
    }
}
