//! # Processing Job State Machine
//!
//! Manages the lifecycle of processing jobs with validated state transitions.
//!
//! ## State Machine
//!
//! ```text
//! Pending → Running → Completed
//!     ↓         ↓         ↑
//!     └──────→ Failed    │
//!     └──────→ Cancelled │
//! ```
//!
//! A job is created `Pending` on submission, moves to `Running` when the
//! scheduler begins its first chunk, and reaches exactly one terminal state.
//! Terminal states cannot transition further. At most one `Running` job
//! exists per engine instance at any time.

use crate::error::{EngineError, Result};
use core_filter::ProcessingSettings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a processing job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Create a new random job ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a job ID from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self> {
        Ok(Self(Uuid::parse_str(s).map_err(|e| {
            EngineError::Internal(format!("Invalid job id '{}': {}", s, e))
        })?))
    }

    /// Get the string representation of this ID
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// The current status of a processing job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job has been created but not yet started
    Pending,
    /// Job is currently running
    Running,
    /// Job completed successfully
    Completed,
    /// Job failed with an error
    Failed,
    /// Job was cancelled by the user
    Cancelled,
}

impl JobStatus {
    /// Check if this status represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Check if this status represents an active state
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for JobStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(EngineError::Internal(format!("Invalid job status: {}", s))),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Progress Types
// ============================================================================

/// Progress information for a running job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Number of samples processed so far
    pub samples_processed: u64,
    /// Total samples in the input signal
    pub total_samples: u64,
    /// Progress percentage (0-100); held below 100 until completion
    pub percent: u8,
}

impl JobProgress {
    /// Create a zeroed progress tracker
    pub fn new() -> Self {
        Self {
            samples_processed: 0,
            total_samples: 0,
            percent: 0,
        }
    }

    /// Update progress from real sample counts.
    ///
    /// The percentage is `floor(100 * processed / total)` capped at 99; only
    /// the completion transition sets it to exactly 100.
    pub fn update(&mut self, samples_processed: u64, total_samples: u64) {
        self.samples_processed = samples_processed;
        self.total_samples = total_samples;

        self.percent = if total_samples > 0 {
            ((samples_processed * 100 / total_samples) as u8).min(99)
        } else {
            0
        };
    }
}

impl Default for JobProgress {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Processing Job Entity
// ============================================================================

/// A processing job with state machine semantics
///
/// Jobs are created in `Pending` state and must move through validated
/// transitions; invalid transitions are errors rather than silent corruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Unique identifier for this job
    pub id: JobId,
    /// Adaptation settings the job runs with
    pub settings: ProcessingSettings,
    /// Current status
    pub status: JobStatus,
    /// Progress information
    pub progress: JobProgress,
    /// Error message if failed
    pub error_message: Option<String>,
    /// When the job was created
    pub created_at: i64,
    /// When the job started running
    pub started_at: Option<i64>,
    /// When the job reached a terminal state
    pub completed_at: Option<i64>,
}

impl ProcessingJob {
    /// Create a new job in pending state.
    ///
    /// Settings are validated by the engine before a job is created; this
    /// constructor only records them.
    pub fn new(id: JobId, settings: ProcessingSettings) -> Self {
        Self {
            id,
            settings,
            status: JobStatus::Pending,
            progress: JobProgress::new(),
            error_message: None,
            created_at: current_timestamp(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Start the job
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not in `Pending` state
    pub fn start(mut self) -> Result<Self> {
        self.validate_transition(JobStatus::Running)?;
        self.status = JobStatus::Running;
        self.started_at = Some(current_timestamp());
        Ok(self)
    }

    /// Update progress from real sample counts
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not in `Running` state
    pub fn update_progress(&mut self, samples_processed: u64, total_samples: u64) -> Result<()> {
        if self.status != JobStatus::Running {
            return Err(EngineError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "update_progress".to_string(),
                reason: "Job must be running to update progress".to_string(),
            });
        }

        self.progress.update(samples_processed, total_samples);
        Ok(())
    }

    /// Mark the job as completed; progress becomes exactly 100.
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not in `Pending` or `Running` state
    pub fn complete(mut self) -> Result<Self> {
        self.validate_transition(JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(current_timestamp());
        self.progress.samples_processed = self.progress.total_samples;
        self.progress.percent = 100;
        Ok(self)
    }

    /// Mark the job as failed with an error message.
    ///
    /// The last valid progress is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the job is already in a terminal state
    pub fn fail(mut self, error_message: String) -> Result<Self> {
        self.validate_transition(JobStatus::Failed)?;
        self.status = JobStatus::Failed;
        self.completed_at = Some(current_timestamp());
        self.error_message = Some(error_message);
        Ok(self)
    }

    /// Cancel the job
    ///
    /// # Errors
    ///
    /// Returns an error if the job is already in a terminal state
    pub fn cancel(mut self) -> Result<Self> {
        self.validate_transition(JobStatus::Cancelled)?;
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(current_timestamp());
        Ok(self)
    }

    /// Get the duration of the job in seconds
    ///
    /// Returns None if the job hasn't started or completed yet
    pub fn duration_secs(&self) -> Option<u64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start) as u64),
            _ => None,
        }
    }

    /// Validate a state transition
    fn validate_transition(&self, to: JobStatus) -> Result<()> {
        let valid = match (self.status, to) {
            // From Pending
            (JobStatus::Pending, JobStatus::Running) => true,
            (JobStatus::Pending, JobStatus::Completed) => true,
            (JobStatus::Pending, JobStatus::Cancelled) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,

            // From Running
            (JobStatus::Running, JobStatus::Completed) => true,
            (JobStatus::Running, JobStatus::Failed) => true,
            (JobStatus::Running, JobStatus::Cancelled) => true,

            // Terminal states cannot transition
            (JobStatus::Completed, _) => false,
            (JobStatus::Failed, _) => false,
            (JobStatus::Cancelled, _) => false,

            // All other transitions are invalid
            _ => false,
        };

        if !valid {
            return Err(EngineError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.status.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

/// Get current Unix timestamp
fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before UNIX epoch")
        .as_secs() as i64
}

// ============================================================================
// Tests
// ============================================================================
