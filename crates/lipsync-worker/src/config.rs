//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lipsync_engine::EngineConfig;
use lipsync_models::parse_timestamp;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Upper bound on one analyze/plan/realign run
    pub job_timeout: Duration,
    /// Base directory for job outputs when the manifest names none
    pub work_dir: PathBuf,
    /// Engine settings used unless the manifest carries its own
    pub engine: EngineConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(300), // 5 minutes
            work_dir: PathBuf::from("/tmp/lipsync"),
            engine: EngineConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup. Unset or unparsable values
    /// fall back to defaults.
    ///
    /// `LIPSYNC_JOB_TIMEOUT` takes plain seconds or `HH:MM:SS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut engine = defaults.engine.clone();
        if let Some(ms) = parse(&lookup, "LIPSYNC_WINDOW_MS") {
            engine = engine.with_window_ms(ms);
        }
        let talk = parse(&lookup, "LIPSYNC_TALK_RATIO").unwrap_or(engine.talk_ratio);
        let silence = parse(&lookup, "LIPSYNC_SILENCE_RATIO").unwrap_or(engine.silence_ratio);
        engine = engine.with_ratios(talk, silence);
        if let Some(secs) = parse(&lookup, "LIPSYNC_LARGE_LOOP_SECS") {
            engine = engine.with_large_loop_min_secs(secs);
        }

        Self {
            job_timeout: lookup("LIPSYNC_JOB_TIMEOUT")
                .and_then(|s| parse_timestamp(&s).ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .unwrap_or(defaults.job_timeout),
            work_dir: lookup("LIPSYNC_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            engine,
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
