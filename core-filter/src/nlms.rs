//! # NLMS Adaptive Filter
//!
//! Per-sample Normalized Least-Mean-Squares filtering over a ring buffer of
//! the signal's own recent past.

use crate::error::{FilterError, Result};
use crate::settings::ProcessingSettings;
use tracing::warn;

/// Small constant preventing division by zero in the step normalization.
pub const REGULARIZATION_EPSILON: f32 = 1e-6;

/// Prediction errors beyond this magnitude mark the filter as diverged.
///
/// Valid samples live in [-1.0, 1.0], so an error of several times full scale
/// can only come from unstable adaptation or out-of-range input.
const DIVERGENCE_LIMIT: f32 = 8.0;

/// NLMS adaptive filter predicting each sample from its recent past.
///
/// State is exactly one coefficient vector and one history ring buffer, both
/// of the configured filter length. The filter is owned by a single job and
/// carries its state across chunk boundaries unchanged; it is never shared
/// and never reset until the job terminates.
pub struct NlmsFilter {
    /// Adaptive coefficients, index k weighting the k-th most recent sample.
    coefficients: Vec<f32>,
    /// Ring buffer of past input samples, zero-padded at signal start.
    history: Vec<f32>,
    /// Next write position in the history ring.
    position: usize,
    /// Adaptation step size (mu).
    step_size: f32,
    /// Latched once instability is detected; updates stop permanently.
    diverged: bool,
}

impl NlmsFilter {
    /// Allocate a zeroed filter for the given settings.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the settings are out of range.
    pub fn new(settings: &ProcessingSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            coefficients: vec![0.0; settings.filter_length],
            history: vec![0.0; settings.filter_length],
            position: 0,
            step_size: settings.step_size,
            diverged: false,
        })
    }

    /// Number of past samples used for prediction.
    pub fn filter_length(&self) -> usize {
        self.coefficients.len()
    }

    /// Adaptation step size.
    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    /// Current coefficient vector, most recent tap first.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Returns `true` once instability has been detected.
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    /// Zero all state for reuse without reallocating.
    pub fn reset(&mut self) {
        self.coefficients.fill(0.0);
        self.history.fill(0.0);
        self.position = 0;
        self.diverged = false;
    }

    /// Process one input sample, returning the cancelled output sample.
    ///
    /// Predicts the component of `x` explainable from the preceding
    /// `filter_length` samples, subtracts it, adapts the coefficients toward
    /// the residual, and pushes `x` into the history.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Divergence`] when the prediction error or a
    /// coefficient becomes non-finite or unbounded. After that, every call
    /// fails and the coefficients are no longer updated; the caller must
    /// terminate the job.
    pub fn process_sample(&mut self, x: f32) -> Result<f32> {
        if self.diverged {
            return Err(FilterError::Divergence);
        }

        let len = self.history.len();

        // Predicted echo and reference energy over the history window,
        // newest sample first.
        let mut predicted = 0.0f32;
        let mut energy = 0.0f32;
        for k in 0..len {
            let idx = (self.position + len - 1 - k) % len;
            let h = self.history[idx];
            predicted += self.coefficients[k] * h;
            energy += h * h;
        }

        let raw_error = x - predicted;
        if !raw_error.is_finite() || raw_error.abs() > DIVERGENCE_LIMIT {
            warn!(raw_error, "Prediction error out of bounds, marking diverged");
            self.diverged = true;
            return Err(FilterError::Divergence);
        }

        let output = raw_error.clamp(-1.0, 1.0);

        // Normalized update: mu_n = mu / (||h||^2 + epsilon).
        let step = self.step_size * output / (energy + REGULARIZATION_EPSILON);

        let mut finite = true;
        for k in 0..len {
            let idx = (self.position + len - 1 - k) % len;
            self.coefficients[k] += step * self.history[idx];
            finite &= self.coefficients[k].is_finite();
        }

        if !finite {
            warn!("Non-finite coefficient after update, marking diverged");
            self.diverged = true;
            return Err(FilterError::Divergence);
        }

        self.history[self.position] = x;
        self.position = (self.position + 1) % len;

        Ok(output)
    }

    /// Process a slice of samples in order, appending outputs to `output`.
    ///
    /// Stops at the first error; outputs appended before the error must be
    /// discarded by the caller together with the job.
    pub fn process_slice(&mut self, input: &[f32], output: &mut Vec<f32>) -> Result<()> {
        output.reserve(input.len());
        for &x in input {
            output.push(self.process_sample(x)?);
        }
        Ok(())
    }
}
