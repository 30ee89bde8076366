//! End-to-end tests for the engine: the full decode → filter → encode
//! pipeline, the execution-boundary protocol, and the single-slot
//! concurrency model.

use bytes::Bytes;
use core_codec::{AudioSignal, SignalCodec, SymphoniaDecoder, WavEncoder};
use core_engine::{Engine, EngineConfig, EngineHandle, EngineMessage, JobId, JobStatus};
use core_filter::ProcessingSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Helpers
// ============================================================================

/// The 440 Hz tone plus a delayed copy of itself, at 16 kHz.
fn echoed_tone(delay_samples: usize, amplitude: f32, total: usize) -> AudioSignal {
    let omega = 2.0 * std::f32::consts::PI * 440.0 / 16_000.0;
    let samples = (0..total)
        .map(|t| {
            let direct = amplitude * (omega * t as f32).sin();
            let echo = if t >= delay_samples {
                0.5 * amplitude * (omega * (t - delay_samples) as f32).sin()
            } else {
                0.0
            };
            direct + echo
        })
        .collect();
    AudioSignal::new(16_000, samples).unwrap()
}

fn silence(total: usize) -> AudioSignal {
    AudioSignal::new(16_000, vec![0.0; total]).unwrap()
}

fn wav_bytes(signal: &AudioSignal) -> Bytes {
    WavEncoder::encode(signal).unwrap()
}

fn small_settings() -> ProcessingSettings {
    ProcessingSettings::new(128, 0.05).unwrap()
}

async fn ready_engine() -> EngineHandle {
    let mut handle = Engine::new(EngineConfig::default()).spawn().unwrap();
    handle.initialize().await.unwrap();
    handle
}

/// Drain messages for one job until its terminal result arrives.
async fn wait_terminal(handle: &mut EngineHandle, job_id: JobId) -> (Vec<u8>, EngineMessage) {
    let collect = async {
        let mut progress = Vec::new();
        while let Some(message) = handle.next_message().await {
            match &message {
                EngineMessage::Progress {
                    job_id: id,
                    percent,
                } if *id == job_id => progress.push(*percent),
                EngineMessage::ProcessResult { job_id: id, .. } if *id == job_id => {
                    return (progress, message.clone())
                }
                _ => {}
            }
        }
        panic!("engine closed before terminal message for {}", job_id);
    };

    timeout(TEST_TIMEOUT, collect)
        .await
        .expect("timed out waiting for terminal message")
}

fn expect_result(message: &EngineMessage) -> (JobStatus, Option<Bytes>, Option<String>) {
    match message {
        EngineMessage::ProcessResult {
            status,
            output_bytes,
            error,
            ..
        } => (*status, output_bytes.clone(), error.clone()),
        other => panic!("expected ProcessResult, got {:?}", other),
    }
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_reduces_echo_and_preserves_length() {
    let input = echoed_tone(8, 1.0, 16_000);
    let input_rms = input.rms();

    let mut handle = ready_engine().await;
    let job_id = handle
        .submit(wav_bytes(&input), small_settings())
        .await
        .unwrap();

    let (progress, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, output_bytes, error) = expect_result(&terminal);

    assert_eq!(status, JobStatus::Completed);
    assert!(error.is_none());

    let output = SymphoniaDecoder::decode(output_bytes.unwrap()).unwrap();
    assert_eq!(output.sample_rate(), 16_000);
    assert_eq!(output.len(), input.len());
    assert!(
        output.rms() < input_rms,
        "expected cancellation to reduce RMS: {} vs {}",
        output.rms(),
        input_rms
    );

    // Progress derived from real chunk boundaries: strictly increasing,
    // ending at exactly 100.
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last(), Some(&100));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_sequential_jobs_produce_identical_output() {
    let input = wav_bytes(&echoed_tone(8, 0.9, 8_000));

    let mut handle = ready_engine().await;

    let first_id = handle
        .submit(input.clone(), small_settings())
        .await
        .unwrap();
    let (_, first_terminal) = wait_terminal(&mut handle, first_id).await;
    let (_, first_bytes, _) = expect_result(&first_terminal);

    let second_id = handle.submit(input, small_settings()).await.unwrap();
    let (_, second_terminal) = wait_terminal(&mut handle, second_id).await;
    let (_, second_bytes, _) = expect_result(&second_terminal);

    // No state leaks between jobs: identical input, identical output.
    assert_eq!(first_bytes.unwrap(), second_bytes.unwrap());

    handle.shutdown().await;
}

// ============================================================================
// Rejection Paths
// ============================================================================

#[tokio::test]
async fn test_process_rejected_before_initialization() {
    let mut handle = Engine::new(EngineConfig::default()).spawn().unwrap();

    let job_id = handle
        .submit(wav_bytes(&silence(1_000)), small_settings())
        .await
        .unwrap();

    let (progress, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, output_bytes, error) = expect_result(&terminal);

    assert!(progress.is_empty());
    assert_eq!(status, JobStatus::Failed);
    assert!(output_bytes.is_none());
    assert!(error.unwrap().contains("not initialized"));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_invalid_settings_rejected_without_running() {
    let mut handle = ready_engine().await;

    let bad_settings = ProcessingSettings {
        filter_length: 100,
        step_size: 0.05,
    };
    let job_id = handle
        .submit(wav_bytes(&silence(1_000)), bad_settings)
        .await
        .unwrap();

    let (progress, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, _, error) = expect_result(&terminal);

    assert!(progress.is_empty());
    assert_eq!(status, JobStatus::Failed);
    assert!(error.unwrap().contains("Invalid filter length"));

    // The engine is still usable after a rejected submission.
    let ok_id = handle
        .submit(wav_bytes(&silence(1_000)), small_settings())
        .await
        .unwrap();
    let (_, terminal) = wait_terminal(&mut handle, ok_id).await;
    assert!(terminal.is_success());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_malformed_bytes_fail_without_running() {
    let mut handle = ready_engine().await;

    let job_id = handle
        .submit(Bytes::from_static(b"not an audio container"), small_settings())
        .await
        .unwrap();

    let (progress, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, _, error) = expect_result(&terminal);

    assert!(progress.is_empty());
    assert_eq!(status, JobStatus::Failed);
    assert!(error.is_some());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_busy_rejection_while_job_is_running() {
    let mut handle = ready_engine().await;

    // A job long enough to still be running when the second submission lands.
    let long_id = handle
        .submit(wav_bytes(&silence(200_000)), small_settings())
        .await
        .unwrap();
    let short_id = handle
        .submit(wav_bytes(&silence(1_000)), small_settings())
        .await
        .unwrap();

    // The dispatch loop consumes in order: the second request is rejected
    // immediately, before the first finishes.
    let (_, busy_terminal) = wait_terminal(&mut handle, short_id).await;
    let (status, output_bytes, error) = expect_result(&busy_terminal);

    assert_eq!(status, JobStatus::Failed);
    assert!(output_bytes.is_none());
    assert!(error.unwrap().contains("already running"));

    // The running job is unaffected by the rejection and completes normally.
    let (progress, terminal) = wait_terminal(&mut handle, long_id).await;
    assert!(terminal.is_success());
    assert_eq!(progress.last(), Some(&100));

    handle.shutdown().await;
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancellation_yields_cancelled_and_frees_slot() {
    let mut handle = ready_engine().await;

    let job_id = handle
        .submit(wav_bytes(&silence(200_000)), small_settings())
        .await
        .unwrap();

    // Wait for evidence the job is running, then cancel.
    let first = timeout(TEST_TIMEOUT, async {
        loop {
            match handle.next_message().await {
                Some(EngineMessage::Progress {
                    job_id: id,
                    percent,
                }) if id == job_id => break percent,
                Some(_) => continue,
                None => panic!("engine closed early"),
            }
        }
    })
    .await
    .expect("timed out waiting for first progress");
    assert!(first < 100);

    handle.cancel(job_id).await.unwrap();

    let (_, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, output_bytes, error) = expect_result(&terminal);

    // Cancelled is terminal and user-requested: no partial result, no error
    // payload, and never a successful ProcessResult for this id.
    assert_eq!(status, JobStatus::Cancelled);
    assert!(output_bytes.is_none());
    assert!(error.is_none());

    // The slot is free again.
    let next_id = handle
        .submit(wav_bytes(&silence(1_000)), small_settings())
        .await
        .unwrap();
    let (_, terminal) = wait_terminal(&mut handle, next_id).await;
    assert!(terminal.is_success());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_cancel_unknown_job_is_ignored() {
    let mut handle = ready_engine().await;

    handle.cancel(JobId::new()).await.unwrap();

    // The engine keeps working.
    let job_id = handle
        .submit(wav_bytes(&silence(1_000)), small_settings())
        .await
        .unwrap();
    let (_, terminal) = wait_terminal(&mut handle, job_id).await;
    assert!(terminal.is_success());

    handle.shutdown().await;
}

// ============================================================================
// Stubbed Codec Paths
// ============================================================================

/// Codec stub handing the engine a fixed decoded signal and raw little-endian
/// f32 bytes on encode.
struct StubCodec {
    signal: AudioSignal,
}

#[async_trait::async_trait]
impl SignalCodec for StubCodec {
    async fn decode(&self, _bytes: Bytes) -> core_codec::Result<AudioSignal> {
        Ok(self.signal.clone())
    }

    async fn encode(&self, signal: &AudioSignal) -> core_codec::Result<Bytes> {
        let raw: Vec<u8> = signal
            .samples()
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        Ok(Bytes::from(raw))
    }
}

#[tokio::test]
async fn test_divergence_aborts_job_with_failed_status() {
    // Pathological amplitude cannot come out of the real codec (decoded
    // samples are clamped), so drive the engine through a stub.
    let stub = StubCodec {
        signal: echoed_tone(4, 100.0, 16_000),
    };
    let mut handle = Engine::with_codec(EngineConfig::default(), Arc::new(stub))
        .spawn()
        .unwrap();
    handle.initialize().await.unwrap();

    let settings = ProcessingSettings::new(128, 0.2).unwrap();
    let job_id = handle.submit(Bytes::from_static(b"stub"), settings).await.unwrap();

    let (_, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, output_bytes, error) = expect_result(&terminal);

    assert_eq!(status, JobStatus::Failed);
    assert!(output_bytes.is_none());
    assert!(error.unwrap().contains("diverged"));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_empty_signal_completes_with_progress_100() {
    let stub = StubCodec {
        signal: AudioSignal::new(16_000, Vec::new()).unwrap(),
    };
    let mut handle = Engine::with_codec(EngineConfig::default(), Arc::new(stub))
        .spawn()
        .unwrap();
    handle.initialize().await.unwrap();

    let job_id = handle
        .submit(Bytes::from_static(b"stub"), small_settings())
        .await
        .unwrap();

    let (progress, terminal) = wait_terminal(&mut handle, job_id).await;
    let (status, output_bytes, error) = expect_result(&terminal);

    assert_eq!(status, JobStatus::Completed);
    assert!(error.is_none());
    assert!(output_bytes.unwrap().is_empty());
    assert_eq!(progress, vec![100]);

    handle.shutdown().await;
}

// ============================================================================
// Disposal
// ============================================================================

#[tokio::test]
async fn test_shutdown_with_job_in_flight() {
    let handle = ready_engine().await;

    let _job_id = handle
        .submit(wav_bytes(&silence(200_000)), small_settings())
        .await
        .unwrap();

    // Disposing the handle discards in-flight job state; this must not hang.
    timeout(TEST_TIMEOUT, handle.shutdown())
        .await
        .expect("shutdown timed out");
}
