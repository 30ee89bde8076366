//! # Codec Error Types
//!
//! Error types for decoding and encoding audio containers.

use thiserror::Error;

/// Errors that can occur while bridging container bytes and sample sequences.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Audio format is not recognized or cannot be parsed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Codec is not supported by the decoder.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Error occurred during audio decoding.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Audio stream is corrupted or contains invalid data.
    #[error("Corrupted audio stream: {0}")]
    CorruptedStream(String),

    /// Failed to produce the output container.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns `true` if this error is related to audio format/codec issues.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidFormat(_) | CodecError::UnsupportedCodec(_)
        )
    }
}

impl From<hound::Error> for CodecError {
    fn from(e: hound::Error) -> Self {
        CodecError::Encode(e.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
