#![deny(unreachable_patterns)]
//! Timeline alignment engine for lip-synced motion clips.
//!
//! This crate provides:
//! - Loudness envelope analysis over decoded audio
//! - Hysteresis talk/idle segmentation with percentile-derived thresholds
//! - Deterministic clip selection from a caller-owned inventory
//! - Timeline planning with video-authoritative drift accumulation
//! - Audio realignment onto the planned video clock
//!
//! Everything here is synchronous and free of I/O. Callers that must not
//! block should run [`AlignmentEngine::run`] on a blocking worker task.

pub mod analyze;
pub mod classifier;
pub mod config;
pub mod envelope;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod planner;
pub mod realign;
pub mod selector;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use analyze::{analyze, Analysis};
pub use classifier::{classify, compute_segment_stats, HysteresisClassifier, SegmentStats};
pub use config::{ChannelMix, EngineConfig};
pub use envelope::{compute_envelope, EnvelopeFrame};
pub use error::{ConfigError, EngineError, EngineResult, InventoryError};
pub use inventory::ClipInventory;
pub use planner::{plan, TimelinePlanner};
pub use realign::{realign, Realigned, ShortfallTruncation};
pub use selector::{ClipSelector, COVER_EPSILON};
pub use thresholds::{derive_thresholds, Thresholds};

use lipsync_models::{DecodedAudio, Segment, TalkTiming, TimelinePlan};
use tracing::debug;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub analysis: Analysis,
    pub plan: TimelinePlan,
    pub realigned: Realigned,
}

/// The three engine entry points bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    config: EngineConfig,
}

impl AlignmentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, audio: &DecodedAudio) -> Analysis {
        analyze(audio, &self.config)
    }

    pub fn plan(
        &self,
        segments: &[Segment],
        inventory: &ClipInventory,
    ) -> EngineResult<TimelinePlan> {
        plan(segments, inventory, &self.config)
    }

    pub fn realign(
        &self,
        audio: &DecodedAudio,
        talk_timings: &[TalkTiming],
        total_duration: f64,
    ) -> Realigned {
        realign(audio, talk_timings, total_duration)
    }

    /// Analyze, plan and realign in one pass. Only planning can fail.
    pub fn run(&self, audio: &DecodedAudio, inventory: &ClipInventory) -> EngineResult<Alignment> {
        let analysis = self.analyze(audio);
        let plan = self.plan(&analysis.segments, inventory)?;
        let realigned = self.realign(audio, &plan.talk_timings, plan.total_duration);

        debug!(
            segments = analysis.segments.len(),
            placements = plan.placements.len(),
            audio_secs = audio.duration_secs(),
            video_secs = plan.total_duration,
            shortfalls = realigned.shortfalls.len(),
            "Alignment run complete"
        );

        Ok(Alignment {
            analysis,
            plan,
            realigned,
        })
    }
}
