//! # Sample Codec Adapter
//!
//! Bridges opaque container bytes and the engine's normalized sample
//! representation.
//!
//! ## Overview
//!
//! This module handles:
//! - Decoding encoded audio containers (WAV/MP3/FLAC/OGG/AAC...) using
//!   symphonia
//! - Downmixing multi-channel input to mono by averaging channels
//! - Normalizing samples to f32 in [-1.0, 1.0]
//! - Re-encoding processed samples as a playback-ready 16-bit PCM WAV
//!   container via hound

pub mod codec;
pub mod decoder;
pub mod error;
pub mod sample_converter;
pub mod signal;
pub mod traits;
pub mod wav;

pub use codec::WavPcmCodec;
pub use decoder::SymphoniaDecoder;
pub use error::{CodecError, Result};
pub use sample_converter::SampleConverter;
pub use signal::AudioSignal;
pub use traits::SignalCodec;
pub use wav::WavEncoder;
