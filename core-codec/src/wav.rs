//! # WAV Output Encoder
//!
//! Re-encodes a processed signal as a playback-ready WAV container.

use crate::error::Result;
use crate::signal::AudioSignal;
use bytes::Bytes;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

/// Bit depth of the output container.
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 16;

/// Encoder producing mono 16-bit integer PCM WAV bytes.
///
/// The output container keeps the input's sample rate and sample count; this
/// is the system's output format contract.
pub struct WavEncoder;

impl WavEncoder {
    /// Encode a signal into an in-memory WAV container.
    pub fn encode(signal: &AudioSignal) -> Result<Bytes> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: signal.sample_rate(),
            bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;

        for &sample in signal.samples() {
            let quantized = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer.write_sample(quantized)?;
        }

        writer.finalize()?;

        let bytes = cursor.into_inner();
        debug!(
            sample_rate = signal.sample_rate(),
            samples = signal.len(),
            output_bytes = bytes.len(),
            "Encoded signal to WAV"
        );

        Ok(Bytes::from(bytes))
    }
}
