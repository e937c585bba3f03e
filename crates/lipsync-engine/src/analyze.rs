//! Audio analysis: decoded buffer to classified segments.
//!
//! This module handles:
//! 1. Building the loudness envelope
//! 2. Deriving hysteresis thresholds from it
//! 3. Classifying windows into merged talk/idle segments

use lipsync_models::{DecodedAudio, Segment};
use serde::Serialize;
use tracing::debug;

use crate::classifier::{classify, compute_segment_stats, SegmentStats};
use crate::config::EngineConfig;
use crate::envelope::compute_envelope;
use crate::metrics;
use crate::thresholds::{derive_thresholds, Thresholds};

/// Output of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Ordered, contiguous segments covering the whole recording.
    pub segments: Vec<Segment>,
    /// Thresholds used, reported for observability.
    pub thresholds: Thresholds,
    /// Number of envelope windows analyzed.
    pub envelope_windows: usize,
    pub stats: SegmentStats,
}

impl Analysis {
    pub fn talk_threshold(&self) -> f32 {
        self.thresholds.talk
    }

    pub fn silence_threshold(&self) -> f32 {
        self.thresholds.silence
    }

    /// True when the recording had no duration; nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Analyze decoded audio and return talk/idle segments.
///
/// Zero-length audio is not an error: it yields an empty segment list.
pub fn analyze(audio: &DecodedAudio, config: &EngineConfig) -> Analysis {
    let total_duration = audio.duration_secs();
    let window_frames = config.window_frames(audio.sample_rate());

    debug!(
        duration_secs = total_duration,
        sample_rate = audio.sample_rate(),
        channels = audio.channels(),
        window_frames = window_frames,
        "Starting audio analysis"
    );

    let envelope = compute_envelope(audio, window_frames, config.channel_mix);
    let thresholds = derive_thresholds(&envelope, config);

    if envelope.is_empty() {
        debug!("Empty audio, no segments");
    }

    let segments = classify(&envelope, thresholds, total_duration);
    let stats = compute_segment_stats(&segments);
    metrics::record_segments(&segments);

    debug!(
        talk_secs = stats.total_talk_secs,
        idle_secs = stats.total_idle_secs,
        talk_ratio = format!("{:.1}%", stats.talk_ratio * 100.0),
        talk_segments = stats.talk_count,
        idle_segments = stats.idle_count,
        "Audio analysis complete"
    );

    Analysis {
        segments,
        thresholds,
        envelope_windows: envelope.len(),
        stats,
    }
}
