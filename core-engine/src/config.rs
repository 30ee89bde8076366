//! # Engine Configuration
//!
//! Scheduling and channel parameters for an engine instance.

use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// Controls chunk granularity and boundary channel capacity. The chunk size
/// is a scheduling/UX parameter: it bounds how long the engine context runs
/// between yields and progress updates, and has no effect on the amount of
/// cancellation performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of samples processed per chunk before yielding.
    ///
    /// Default: 4096 samples (~93ms at 44.1kHz).
    #[serde(default = "default_chunk_samples")]
    pub chunk_samples: usize,

    /// Capacity of each boundary message queue.
    ///
    /// Sized to hold a full job's worth of progress updates plus the
    /// terminal message even if the host drains late.
    ///
    /// Default: 256 messages.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_samples: default_chunk_samples(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl EngineConfig {
    /// Set the chunk size in samples.
    pub fn with_chunk_samples(mut self, chunk_samples: usize) -> Self {
        self.chunk_samples = chunk_samples;
        self
    }

    /// Set the boundary channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_samples == 0 {
            return Err("chunk_samples must be > 0".to_string());
        }

        if self.channel_capacity == 0 {
            return Err("channel_capacity must be > 0".to_string());
        }

        Ok(())
    }
}

fn default_chunk_samples() -> usize {
    4096
}

fn default_channel_capacity() -> usize {
    256
}
