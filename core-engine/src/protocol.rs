//! # Execution-Boundary Protocol
//!
//! The typed wire contract between a host and the engine context. Each
//! direction is a bounded message queue; the engine consumes the host queue
//! with an explicit dispatch loop, and the host drains engine messages at its
//! own pace.
//!
//! ## Message Flow
//!
//! ```text
//! ┌──────┐   Init / Process / Cancel    ┌────────────────┐
//! │ Host ├─────────────────────────────>│ Engine context │
//! │      │<─────────────────────────────┤ (dispatch loop)│
//! └──────┘  Ready / InitResult /        └────────────────┘
//!           Progress / ProcessResult
//! ```
//!
//! Sample buffers travel as [`Bytes`] moved into the message: sending a
//! `Process` message consumes the buffer binding on the host side, so large
//! signals cross the boundary without copying. Every message after `Init`
//! carries a `job_id`, keeping sequential jobs distinguishable even though
//! only one may be running at a time.
//!
//! ## Ordering Guarantees
//!
//! For a given job id, `Progress` percentages are strictly increasing and are
//! followed by exactly one terminal [`EngineMessage::ProcessResult`]. Every
//! failure path produces exactly one terminal message; no error is silently
//! swallowed.

use crate::job::{JobId, JobStatus};
use bytes::Bytes;
use core_filter::ProcessingSettings;
use serde::{Deserialize, Serialize};

// ============================================================================
// Host → Engine Messages
// ============================================================================

/// Messages sent from the host context to the engine context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum HostMessage {
    /// Prepare the engine for processing requests.
    Init,
    /// Submit a processing job over an encoded signal buffer.
    Process {
        /// Host-assigned identifier for the job.
        job_id: JobId,
        /// Encoded container bytes, ownership moved into the message.
        signal_bytes: Bytes,
        /// Adaptation settings, validated before a job is created.
        settings: ProcessingSettings,
    },
    /// Request cancellation of a running job.
    Cancel {
        /// The job to cancel.
        job_id: JobId,
    },
}

impl HostMessage {
    /// Returns a human-readable description of the message.
    pub fn description(&self) -> &str {
        match self {
            HostMessage::Init => "Initialize engine",
            HostMessage::Process { .. } => "Submit processing job",
            HostMessage::Cancel { .. } => "Cancel running job",
        }
    }
}

// ============================================================================
// Engine → Host Messages
// ============================================================================

/// Messages sent from the engine context back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineMessage {
    /// The engine context is up and consuming its queue.
    Ready,
    /// Response to [`HostMessage::Init`].
    InitResult {
        /// Whether initialization succeeded.
        success: bool,
        /// Error description when `success` is false.
        error: Option<String>,
    },
    /// Progress update for a running job, derived from samples processed.
    Progress {
        /// The job this update belongs to.
        job_id: JobId,
        /// Percent complete (0-100), strictly increasing per job.
        percent: u8,
    },
    /// Terminal result for a job. Emitted exactly once per job id.
    ProcessResult {
        /// The job this result belongs to.
        job_id: JobId,
        /// Terminal status: `Completed`, `Failed`, or `Cancelled`.
        status: JobStatus,
        /// Encoded output container, present only on success.
        output_bytes: Option<Bytes>,
        /// Error description, present only on failure. Cancelled results
        /// never carry an error payload.
        error: Option<String>,
    },
}

impl EngineMessage {
    /// Terminal result for a successfully completed job.
    pub fn completed(job_id: JobId, output_bytes: Bytes) -> Self {
        EngineMessage::ProcessResult {
            job_id,
            status: JobStatus::Completed,
            output_bytes: Some(output_bytes),
            error: None,
        }
    }

    /// Terminal result for a failed job.
    pub fn failed(job_id: JobId, error: String) -> Self {
        EngineMessage::ProcessResult {
            job_id,
            status: JobStatus::Failed,
            output_bytes: None,
            error: Some(error),
        }
    }

    /// Terminal result for a cancelled job; carries no error payload.
    pub fn cancelled(job_id: JobId) -> Self {
        EngineMessage::ProcessResult {
            job_id,
            status: JobStatus::Cancelled,
            output_bytes: None,
            error: None,
        }
    }

    /// The job id this message refers to, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            EngineMessage::Ready | EngineMessage::InitResult { .. } => None,
            EngineMessage::Progress { job_id, .. } => Some(*job_id),
            EngineMessage::ProcessResult { job_id, .. } => Some(*job_id),
        }
    }

    /// Returns `true` for a terminal `ProcessResult` with `Completed` status.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            EngineMessage::ProcessResult {
                status: JobStatus::Completed,
                ..
            }
        )
    }

    /// Returns a human-readable description of the message.
    pub fn description(&self) -> &str {
        match self {
            EngineMessage::Ready => "Engine ready",
            EngineMessage::InitResult { .. } => "Initialization result",
            EngineMessage::Progress { .. } => "Job progress update",
            EngineMessage::ProcessResult { .. } => "Job terminal result",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
