//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the echo processing core:
//! - Logging and tracing infrastructure
//! - Runtime-level error types
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other workspace crates depend
//! on. It establishes the logging conventions used throughout the system; the
//! engine, codec, and filter crates emit structured `tracing` events and leave
//! subscriber setup to the host via this crate.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
