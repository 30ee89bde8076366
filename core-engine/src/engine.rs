//! # Engine Lifecycle & Dispatch Loop
//!
//! An explicit handle/instance around the engine execution context. Hosts
//! construct an [`Engine`], spawn it into an [`EngineHandle`], initialize it,
//! submit jobs, and dispose of it. There is no implicit global engine.
//!
//! ## Contexts
//!
//! Two execution contexts exist: the host context (whoever holds the
//! [`EngineHandle`]) and the engine context (a spawned task running the
//! dispatch loop). They share no memory; sample buffers move across the
//! boundary inside protocol messages. While a job runs in its own task, the
//! dispatch loop keeps consuming the host queue, so `Cancel` requests and
//! Busy rejections are handled immediately.
//!
//! ## Usage
//!
//! ```no_run
//! use bytes::Bytes;
//! use core_engine::{Engine, EngineConfig, EngineMessage};
//! use core_filter::ProcessingSettings;
//!
//! # async fn example(input: Bytes) -> core_engine::Result<()> {
//! let mut handle = Engine::new(EngineConfig::default()).spawn()?;
//! handle.initialize().await?;
//!
//! let job_id = handle.submit(input, ProcessingSettings::default()).await?;
//!
//! while let Some(message) = handle.next_message().await {
//!     match message {
//!         EngineMessage::Progress { percent, .. } => println!("{}%", percent),
//!         EngineMessage::ProcessResult { .. } => break,
//!         _ => {}
//!     }
//! }
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::job::{JobId, ProcessingJob};
use crate::protocol::{EngineMessage, HostMessage};
use crate::scheduler::{ChunkScheduler, JobOutcome};
use bytes::Bytes;
use core_codec::{SignalCodec, WavPcmCodec};
use core_filter::ProcessingSettings;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// ============================================================================
// Engine Construction
// ============================================================================

/// Builder for an engine instance.
pub struct Engine {
    config: EngineConfig,
    codec: Arc<dyn SignalCodec>,
}

impl Engine {
    /// Create an engine with the default Symphonia/WAV codec adapter.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            codec: Arc::new(WavPcmCodec::new()),
        }
    }

    /// Create an engine with a custom codec adapter.
    pub fn with_codec(config: EngineConfig, codec: Arc<dyn SignalCodec>) -> Self {
        Self { config, codec }
    }

    /// Spawn the engine context and return the host-side handle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the configuration is invalid.
    pub fn spawn(self) -> Result<EngineHandle> {
        self.config.validate().map_err(EngineError::Config)?;

        let (host_tx, host_rx) = mpsc::channel(self.config.channel_capacity);
        let (engine_tx, engine_rx) = mpsc::channel(self.config.channel_capacity);

        let task = tokio::spawn(run_dispatch(self.config, self.codec, host_rx, engine_tx));

        Ok(EngineHandle {
            host_tx,
            engine_rx,
            task,
        })
    }
}

// ============================================================================
// Host-Side Handle
// ============================================================================

/// Host-side handle to a spawned engine context.
///
/// Dropping the handle (or calling [`EngineHandle::shutdown`]) closes the
/// host queue; the dispatch loop then stops and discards any in-flight job
/// state. This is the host's recourse for a wedged job; there is no
/// internal timeout.
pub struct EngineHandle {
    host_tx: mpsc::Sender<HostMessage>,
    engine_rx: mpsc::Receiver<EngineMessage>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Send a raw protocol message to the engine context.
    pub async fn send(&self, message: HostMessage) -> Result<()> {
        self.host_tx
            .send(message)
            .await
            .map_err(|_| EngineError::ChannelClosed)
    }

    /// Receive the next engine message; `None` once the engine context ends.
    pub async fn next_message(&mut self) -> Option<EngineMessage> {
        self.engine_rx.recv().await
    }

    /// Send `Init` and wait for the matching `InitResult`.
    ///
    /// The engine's startup `Ready` message is consumed along the way.
    pub async fn initialize(&mut self) -> Result<()> {
        self.send(HostMessage::Init).await?;

        while let Some(message) = self.next_message().await {
            match message {
                EngineMessage::Ready => continue,
                EngineMessage::InitResult { success: true, .. } => return Ok(()),
                EngineMessage::InitResult {
                    success: false,
                    error,
                } => {
                    return Err(EngineError::Internal(
                        error.unwrap_or_else(|| "Initialization failed".to_string()),
                    ))
                }
                other => {
                    debug!(
                        "Ignoring message while waiting for InitResult: {}",
                        other.description()
                    );
                }
            }
        }

        Err(EngineError::ChannelClosed)
    }

    /// Submit a processing job, returning its host-assigned id.
    ///
    /// Rejections (Busy, NotInitialized, validation, decode) arrive as an
    /// immediate terminal `ProcessResult` for this id.
    pub async fn submit(&self, signal_bytes: Bytes, settings: ProcessingSettings) -> Result<JobId> {
        let job_id = JobId::new();
        self.send(HostMessage::Process {
            job_id,
            signal_bytes,
            settings,
        })
        .await?;
        Ok(job_id)
    }

    /// Request cancellation of a running job.
    pub async fn cancel(&self, job_id: JobId) -> Result<()> {
        self.send(HostMessage::Cancel { job_id }).await
    }

    /// Dispose of the engine context, discarding any in-flight job state.
    pub async fn shutdown(self) {
        let EngineHandle {
            host_tx,
            engine_rx,
            task,
        } = self;

        drop(host_tx);
        drop(engine_rx);

        if let Err(e) = task.await {
            if e.is_panic() {
                error!("Engine context panicked during shutdown: {}", e);
            }
        }
    }
}

// ============================================================================
// Engine Context
// ============================================================================

/// Bookkeeping for the single running job slot.
struct ActiveJob {
    job_id: JobId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The engine context's dispatch loop.
///
/// Consumes the host queue one message at a time. A running job occupies the
/// single concurrency slot in its own task; the loop stays responsive to
/// `Cancel` and rejects further `Process` requests with Busy until the slot
/// frees.
async fn run_dispatch(
    config: EngineConfig,
    codec: Arc<dyn SignalCodec>,
    mut host_rx: mpsc::Receiver<HostMessage>,
    engine_tx: mpsc::Sender<EngineMessage>,
) {
    info!("Engine context started");
    let _ = engine_tx.send(EngineMessage::Ready).await;

    let mut initialized = false;
    let mut active: Option<ActiveJob> = None;

    loop {
        tokio::select! {
            join_result = async {
                (&mut active.as_mut().expect("guarded by is_some").handle).await
            }, if active.is_some() => {
                let finished = active.take().expect("guarded by is_some");
                if let Err(e) = join_result {
                    // The job task never reached its terminal send; emit the
                    // failure here so the job still gets exactly one result.
                    error!(job_id = %finished.job_id, "Job task aborted: {}", e);
                    let _ = engine_tx
                        .send(EngineMessage::failed(
                            finished.job_id,
                            EngineError::Internal(format!("Job task aborted: {}", e)).to_string(),
                        ))
                        .await;
                }
            }

            maybe_message = host_rx.recv() => {
                let Some(message) = maybe_message else { break };
                debug!("Dispatching host message: {}", message.description());

                match message {
                    HostMessage::Init => {
                        initialized = true;
                        let _ = engine_tx
                            .send(EngineMessage::InitResult {
                                success: true,
                                error: None,
                            })
                            .await;
                    }

                    HostMessage::Process { job_id, signal_bytes, settings } => {
                        if !initialized {
                            warn!(%job_id, "Rejecting job: engine not initialized");
                            let _ = engine_tx
                                .send(EngineMessage::failed(
                                    job_id,
                                    EngineError::NotInitialized.to_string(),
                                ))
                                .await;
                            continue;
                        }

                        if active.is_some() {
                            warn!(%job_id, "Rejecting job: a job is already running");
                            let _ = engine_tx
                                .send(EngineMessage::failed(
                                    job_id,
                                    EngineError::Busy.to_string(),
                                ))
                                .await;
                            continue;
                        }

                        if let Err(e) = settings.validate() {
                            warn!(%job_id, "Rejecting job: {}", e);
                            let _ = engine_tx
                                .send(EngineMessage::failed(
                                    job_id,
                                    EngineError::from(e).to_string(),
                                ))
                                .await;
                            continue;
                        }

                        info!(%job_id, input_bytes = signal_bytes.len(), "Accepting job");
                        let token = CancellationToken::new();
                        let handle = tokio::spawn(run_job(
                            job_id,
                            signal_bytes,
                            settings,
                            Arc::clone(&codec),
                            config.chunk_samples,
                            token.clone(),
                            engine_tx.clone(),
                        ));
                        active = Some(ActiveJob { job_id, token, handle });
                    }

                    HostMessage::Cancel { job_id } => match &active {
                        Some(job) if job.job_id == job_id => {
                            info!(%job_id, "Cancellation requested");
                            job.token.cancel();
                        }
                        _ => {
                            debug!(%job_id, "Cancel request for unknown or finished job");
                        }
                    },
                }
            }
        }
    }

    // Host handle dropped: dispose of any in-flight job state.
    if let Some(job) = active.take() {
        warn!(job_id = %job.job_id, "Engine disposed with job in flight, discarding state");
        job.token.cancel();
        job.handle.abort();
    }

    info!("Engine context stopped");
}

/// One end-to-end job: decode, schedule through the filter, encode, and emit
/// exactly one terminal message.
async fn run_job(
    job_id: JobId,
    signal_bytes: Bytes,
    settings: ProcessingSettings,
    codec: Arc<dyn SignalCodec>,
    chunk_samples: usize,
    token: CancellationToken,
    engine_tx: mpsc::Sender<EngineMessage>,
) {
    let job = ProcessingJob::new(job_id, settings);

    let signal = match codec.decode(signal_bytes).await {
        Ok(signal) => signal,
        Err(e) => {
            warn!(%job_id, "Decode failed: {}", e);
            let _ = engine_tx
                .send(EngineMessage::failed(
                    job_id,
                    EngineError::from(e).to_string(),
                ))
                .await;
            return;
        }
    };

    debug!(
        %job_id,
        samples = signal.len(),
        sample_rate = signal.sample_rate(),
        "Signal decoded"
    );

    let scheduler = ChunkScheduler::new(chunk_samples);
    let outcome = scheduler
        .run(job, signal, &token, |percent| {
            // Progress is advisory; a full queue drops the update rather
            // than stalling the chunk loop. The terminal result below is
            // always delivered with a waiting send.
            if engine_tx
                .try_send(EngineMessage::Progress { job_id, percent })
                .is_err()
            {
                debug!(%job_id, percent, "Dropping progress update, queue full");
            }
        })
        .await;

    let terminal = match outcome {
        Ok(JobOutcome::Completed { job, output }) => match codec.encode(&output).await {
            Ok(bytes) => {
                info!(
                    %job_id,
                    duration_secs = ?job.duration_secs(),
                    output_bytes = bytes.len(),
                    "Job completed"
                );
                EngineMessage::completed(job_id, bytes)
            }
            Err(e) => {
                error!(%job_id, "Encoding failed: {}", e);
                EngineMessage::failed(job_id, EngineError::from(e).to_string())
            }
        },
        Ok(JobOutcome::Failed { job, error }) => {
            warn!(%job_id, percent = job.progress.percent, "Job failed: {}", error);
            EngineMessage::failed(job_id, error.to_string())
        }
        Ok(JobOutcome::Cancelled { job }) => {
            info!(%job_id, percent = job.progress.percent, "Job cancelled");
            EngineMessage::cancelled(job_id)
        }
        Err(e) => {
            error!(%job_id, "Job lifecycle error: {}", e);
            EngineMessage::failed(job_id, e.to_string())
        }
    };

    let _ = engine_tx.send(terminal).await;
}
