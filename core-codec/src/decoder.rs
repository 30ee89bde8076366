//! # Symphonia Decoder Implementation
//!
//! Decodes an in-memory encoded container into a normalized [`AudioSignal`].

use crate::error::{CodecError, Result};
use crate::sample_converter::SampleConverter;
use crate::signal::AudioSignal;
use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, warn};

/// Abort decoding after this many consecutive bad packets.
const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Decoder for complete, in-memory audio containers.
///
/// Drives Symphonia's probe → demux → decode pipeline over a byte buffer and
/// collects the full sample sequence, downmixed to mono. The decoder skips
/// isolated corrupted packets and only fails the stream after repeated
/// consecutive errors.
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Decode container bytes into a mono [`AudioSignal`].
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidFormat`] if the container cannot be probed or
    ///   has no audio track with a known codec
    /// - [`CodecError::DecodingError`] on unrecoverable decoder failures
    /// - [`CodecError::CorruptedStream`] after too many consecutive bad
    ///   packets
    pub fn decode(bytes: Bytes) -> Result<AudioSignal> {
        debug!(input_bytes = bytes.len(), "Decoding audio container");

        let cursor = Cursor::new(bytes.to_vec());
        let media_source = Box::new(cursor) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let probe_result = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format probe failed: {}", e);
                CodecError::InvalidFormat(format!("Failed to probe format: {}", e))
            })?;

        let mut format_reader = probe_result.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                error!("No supported audio tracks found");
                CodecError::InvalidFormat("No supported audio tracks".to_string())
            })?;

        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| CodecError::InvalidFormat("Missing sample rate".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                CodecError::UnsupportedCodec(format!("Failed to create codec decoder: {}", e))
            })?;

        let mut samples: Vec<f32> = Vec::new();
        let mut consecutive_errors = 0;

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Decoder reset required for track list change");
                    return Err(CodecError::DecodingError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    // Normal end of stream for an in-memory source.
                    break;
                }
                Err(e) => {
                    error!("Fatal format reader error: {}", e);
                    return Err(CodecError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    consecutive_errors = 0;
                    samples.extend(SampleConverter::to_mono_f32(&decoded));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (I/O error, attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(CodecError::CorruptedStream(format!(
                            "Stream corruption after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping packet with decode error (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(CodecError::CorruptedStream(format!(
                            "Stream corruption after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                }
                Err(e) => {
                    error!("Fatal decode error: {}", e);
                    return Err(CodecError::DecodingError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }

        SampleConverter::clamp_samples(&mut samples);

        debug!(
            sample_rate,
            samples = samples.len(),
            "Decoded container to mono signal"
        );

        AudioSignal::new(sample_rate, samples)
    }
}
