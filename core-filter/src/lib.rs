//! # Adaptive Filter Core
//!
//! The numerical heart of the echo processing system: a Normalized
//! Least-Mean-Squares (NLMS) adaptive filter that predicts each sample from
//! the signal's own recent past and subtracts the predictable component.
//!
//! ## Overview
//!
//! The filter is single-channel and self-referential: repetitive structure in
//! the signal itself (e.g., a periodic echo) is treated as the component to
//! predict and remove. There is no separate loudspeaker-reference channel;
//! the reference vector is the sliding window of preceding input samples.
//!
//! ## Usage
//!
//! ```rust
//! use core_filter::{NlmsFilter, ProcessingSettings};
//!
//! let settings = ProcessingSettings::default();
//! let mut filter = NlmsFilter::new(&settings).unwrap();
//!
//! let cleaned: Vec<f32> = [0.0f32, 0.1, -0.1, 0.2]
//!     .iter()
//!     .map(|&x| filter.process_sample(x).unwrap())
//!     .collect();
//! assert_eq!(cleaned.len(), 4);
//! ```

pub mod error;
pub mod nlms;
pub mod settings;

pub use error::{FilterError, Result};
pub use nlms::NlmsFilter;
pub use settings::ProcessingSettings;
