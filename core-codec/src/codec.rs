//! # Production Codec Adapter
//!
//! Symphonia-backed decoding combined with WAV PCM output encoding.

use crate::decoder::SymphoniaDecoder;
use crate::error::Result;
use crate::signal::AudioSignal;
use crate::traits::SignalCodec;
use crate::wav::WavEncoder;
use async_trait::async_trait;
use bytes::Bytes;

/// Default codec adapter: decodes any Symphonia-supported container and
/// encodes results as mono 16-bit PCM WAV.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavPcmCodec;

impl WavPcmCodec {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalCodec for WavPcmCodec {
    async fn decode(&self, bytes: Bytes) -> Result<AudioSignal> {
        SymphoniaDecoder::decode(bytes)
    }

    async fn encode(&self, signal: &AudioSignal) -> Result<Bytes> {
        WavEncoder::encode(signal)
    }
}
