//! Example: remove echo artifacts from an audio file.
//!
//! Usage: cargo run --example process_file -- input.wav output.wav

use anyhow::{bail, Context};
use bytes::Bytes;
use core_engine::{Engine, EngineConfig, EngineMessage, JobStatus};
use core_filter::ProcessingSettings;
use core_runtime::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default()).context("Failed to initialize logging")?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("Usage: {} <input audio> <output.wav>", args[0]);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let input = std::fs::read(input_path)
        .with_context(|| format!("Failed to read input file {}", input_path))?;
    println!("Read {} bytes from {}", input.len(), input_path);

    let mut handle = Engine::new(EngineConfig::default()).spawn()?;
    handle.initialize().await?;

    let settings = ProcessingSettings::default();
    let job_id = handle.submit(Bytes::from(input), settings).await?;
    println!(
        "Submitted job {} (filter length {}, step size {})",
        job_id, settings.filter_length, settings.step_size
    );

    while let Some(message) = handle.next_message().await {
        match message {
            EngineMessage::Progress { percent, .. } => {
                print!("\rProcessing: {:3}%", percent);
            }
            EngineMessage::ProcessResult {
                status,
                output_bytes,
                error,
                ..
            } => {
                println!();
                match status {
                    JobStatus::Completed => {
                        let bytes = output_bytes.context("Completed job without output")?;
                        std::fs::write(output_path, &bytes)
                            .with_context(|| format!("Failed to write {}", output_path))?;
                        println!("Saved {} bytes to {}", bytes.len(), output_path);
                        break;
                    }
                    JobStatus::Cancelled => bail!("Job was cancelled"),
                    _ => bail!(
                        "Processing failed: {}",
                        error.unwrap_or_else(|| "unknown error".to_string())
                    ),
                }
            }
            _ => {}
        }
    }

    handle.shutdown().await;
    Ok(())
}
