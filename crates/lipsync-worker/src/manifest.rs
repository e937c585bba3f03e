//! Job manifest: what one alignment job reads and where it writes.

use std::fmt;
use std::path::{Path, PathBuf};

use lipsync_engine::{ClipInventory, EngineConfig};
use lipsync_models::MotionClip;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::pcm::SampleFormat;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw PCM input as produced by the decode step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    pub path: PathBuf,
    #[serde(default)]
    pub format: SampleFormat,
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_channels() -> u16 {
    1
}

/// One alignment job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobManifest {
    #[serde(default)]
    pub job_id: JobId,
    pub audio: AudioSource,
    pub clips: Vec<MotionClip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Per-job engine settings; the worker's configured engine otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,
}

impl JobManifest {
    /// Read and validate a manifest. Relative paths resolve against the
    /// manifest's own directory.
    pub async fn load(path: &Path) -> WorkerResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let mut manifest: JobManifest = serde_json::from_str(&text)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.audio.path = resolve(base, &manifest.audio.path);
        manifest.output_dir = manifest.output_dir.map(|dir| resolve(base, &dir));

        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> WorkerResult<()> {
        if self.audio.sample_rate == 0 {
            return Err(WorkerError::invalid_manifest("audio.sampleRate must be positive"));
        }
        if self.audio.channels == 0 {
            return Err(WorkerError::invalid_manifest("audio.channels must be positive"));
        }
        if self.job_id.as_str().is_empty() {
            return Err(WorkerError::invalid_manifest("jobId must not be empty"));
        }
        if let Some(engine) = &self.engine {
            engine
                .validate()
                .map_err(|e| WorkerError::invalid_manifest(format!("engine: {}", e)))?;
        }
        Ok(())
    }

    /// Clip inventory in manifest order.
    pub fn inventory(&self) -> WorkerResult<ClipInventory> {
        Ok(ClipInventory::from_clips(self.clips.iter().cloned())?)
    }

    /// Engine settings for this job.
    pub fn engine_config(&self, config: &WorkerConfig) -> EngineConfig {
        self.engine.clone().unwrap_or_else(|| config.engine.clone())
    }

    /// Where this job writes its outputs.
    pub fn output_dir(&self, config: &WorkerConfig) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| config.work_dir.join(self.job_id.as_str()))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
