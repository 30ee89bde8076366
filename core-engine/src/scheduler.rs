//! # Chunked Processing Scheduler
//!
//! Drives one persistent filter over a full signal in bounded slices,
//! yielding control and reporting progress between chunks without changing
//! the amount of cancellation performed.
//!
//! ## Overview
//!
//! The scheduler owns the job's [`NlmsFilter`] for the duration of one run.
//! Coefficients and history carry forward across chunk boundaries untouched;
//! chunking only bounds how long the engine context runs between yields.
//! Between chunks the scheduler checks for cooperative cancellation and
//! reports progress derived from real sample counts. Filter state is dropped
//! when the run returns, whatever the outcome.

use crate::error::{EngineError, Result};
use crate::job::ProcessingJob;
use core_codec::AudioSignal;
use core_filter::NlmsFilter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal outcome of one scheduler run.
#[derive(Debug)]
pub enum JobOutcome {
    /// The full signal was processed; output length equals input length.
    Completed {
        job: ProcessingJob,
        output: AudioSignal,
    },
    /// Processing aborted mid-stream; the last valid progress is preserved.
    Failed {
        job: ProcessingJob,
        error: EngineError,
    },
    /// Cancellation was observed at a chunk boundary; no partial result.
    Cancelled { job: ProcessingJob },
}

/// Schedules one job's samples through the filter core in bounded chunks.
pub struct ChunkScheduler {
    chunk_samples: usize,
}

impl ChunkScheduler {
    /// Create a scheduler with the given chunk size in samples.
    pub fn new(chunk_samples: usize) -> Self {
        Self { chunk_samples }
    }

    /// Process an entire signal through one persistent filter.
    ///
    /// `on_progress` is invoked at chunk boundaries with strictly increasing
    /// percentages, ending with exactly 100 at completion. The token is
    /// checked only at chunk boundaries; cancellation is cooperative, not
    /// preemptive.
    ///
    /// # Errors
    ///
    /// Only lifecycle bookkeeping errors propagate as `Err`; processing
    /// failures (divergence) are reported through [`JobOutcome::Failed`] with
    /// the job in its terminal state.
    pub async fn run(
        &self,
        job: ProcessingJob,
        signal: AudioSignal,
        token: &CancellationToken,
        mut on_progress: impl FnMut(u8),
    ) -> Result<JobOutcome> {
        let total = signal.len() as u64;
        let sample_rate = signal.sample_rate();

        // Empty input completes immediately without touching the filter.
        if signal.is_empty() {
            let job = job.complete()?;
            on_progress(100);
            debug!(job_id = %job.id, "Empty signal, completing immediately");
            return Ok(JobOutcome::Completed {
                job,
                output: AudioSignal::new(sample_rate, Vec::new())?,
            });
        }

        let mut filter = NlmsFilter::new(&job.settings)?;
        let mut job = job.start()?;

        let mut output: Vec<f32> = Vec::with_capacity(signal.len());
        let samples = signal.into_samples();
        let mut last_reported: u8 = 0;

        for chunk in samples.chunks(self.chunk_samples) {
            if token.is_cancelled() {
                info!(job_id = %job.id, "Cancellation observed at chunk boundary");
                let job = job.cancel()?;
                return Ok(JobOutcome::Cancelled { job });
            }

            if let Err(e) = filter.process_slice(chunk, &mut output) {
                warn!(
                    job_id = %job.id,
                    percent = job.progress.percent,
                    "Aborting job mid-chunk: {}",
                    e
                );
                let error = EngineError::from(e);
                let job = job.fail(error.to_string())?;
                return Ok(JobOutcome::Failed { job, error });
            }

            job.update_progress(output.len() as u64, total)?;
            if job.progress.percent > last_reported {
                last_reported = job.progress.percent;
                on_progress(last_reported);
            }

            // The engine context's only suspension point: hand control back
            // to the scheduler between chunks so the host stays responsive.
            tokio::task::yield_now().await;
        }

        if token.is_cancelled() {
            info!(job_id = %job.id, "Cancellation observed at final chunk boundary");
            let job = job.cancel()?;
            return Ok(JobOutcome::Cancelled { job });
        }

        let job = job.complete()?;
        on_progress(100);
        debug!(job_id = %job.id, samples = output.len(), "All chunks processed");

        Ok(JobOutcome::Completed {
            job,
            output: AudioSignal::new(sample_rate, output)?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
