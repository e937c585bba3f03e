//! Worker error types.

use std::time::Duration;

use lipsync_engine::{EngineError, InventoryError};
use lipsync_models::AudioError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("Job timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn invalid_manifest(msg: impl Into<String>) -> Self {
        Self::InvalidManifest(msg.into())
    }

    pub fn invalid_audio(msg: impl Into<String>) -> Self {
        Self::InvalidAudio(msg.into())
    }

    /// Check if the job failed because of its inputs rather than the host.
    ///
    /// These need user action (add a clip, fix the manifest) and will fail
    /// the same way on every retry.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            WorkerError::InvalidManifest(_)
                | WorkerError::InvalidAudio(_)
                | WorkerError::Engine(EngineError::MissingCategory { .. })
                | WorkerError::Inventory(_)
                | WorkerError::Audio(_)
        )
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        if self.is_configuration_error() {
            2
        } else {
            1
        }
    }
}
