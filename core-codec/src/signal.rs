//! # Audio Signal Model
//!
//! The engine's normalized representation of a decoded audio stream: a mono
//! sequence of f32 samples in [-1.0, 1.0] at a known sample rate.

use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// A decoded, mono audio signal.
///
/// Constructed once by the codec adapter and treated as immutable afterwards:
/// fields are private and only exposed through read accessors. The channel
/// count is always 1; the adapter downmixes multi-channel input before a
/// signal is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSignal {
    /// Sample rate in Hz (e.g., 44100, 48000). Always positive.
    sample_rate: u32,
    /// Ordered mono samples, normalized to [-1.0, 1.0].
    samples: Vec<f32>,
}

impl AudioSignal {
    /// Create a signal from mono samples at the given rate.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] if `sample_rate` is zero.
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CodecError::InvalidFormat(
                "Sample rate must be positive".to_string(),
            ));
        }

        Ok(Self {
            sample_rate,
            samples,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The sample sequence, oldest first.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the signal, returning its sample buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Number of samples in the signal.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the signal contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Root-mean-square level of the signal, 0.0 for an empty signal.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_squares / self.samples.len() as f64).sqrt() as f32
    }
}
