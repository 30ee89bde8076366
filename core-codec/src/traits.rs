//! # Codec Adapter Trait
//!
//! The seam between the processing engine and container handling. The engine
//! consumes an `Arc<dyn SignalCodec>` so tests can substitute a stub codec
//! and hosts can swap in alternative container support.

use crate::error::Result;
use crate::signal::AudioSignal;
use async_trait::async_trait;
use bytes::Bytes;

/// Bridges opaque container bytes and normalized mono signals.
#[async_trait]
pub trait SignalCodec: Send + Sync {
    /// Decode encoded container bytes into a mono [`AudioSignal`].
    ///
    /// Multi-channel input is downmixed to mono by averaging channels.
    async fn decode(&self, bytes: Bytes) -> Result<AudioSignal>;

    /// Encode a processed signal into a playback-ready output container.
    ///
    /// The output keeps the signal's sample rate and sample count.
    async fn encode(&self, signal: &AudioSignal) -> Result<Bytes>;
}
