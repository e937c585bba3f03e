//! Alignment job worker.
//!
//! This crate provides:
//! - Environment-driven worker configuration
//! - Job manifests and raw PCM input/output
//! - Job execution on a blocking task with a timeout
//! - Structured per-job logging

pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod pcm;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use job::{AlignmentJob, JobOutputs, JobReport};
pub use logging::JobLogger;
pub use manifest::{AudioSource, JobId, JobManifest};
pub use pcm::SampleFormat;
