//! State machine for converting a loudness envelope to talk/idle segments.
//!
//! # State Machine
//!
//! ```text
//!                    loudness >= talk threshold
//!     ┌─────────────────────────────────────────────────┐
//!     │                                                 ▼
//! ┌─────────┐                                     ┌─────────┐
//! │  Idle   │                                     │  Talk   │
//! └─────────┘                                     └─────────┘
//!     ▲                                                 │
//!     └─────────────────────────────────────────────────┘
//!                    loudness < silence threshold
//! ```
//!
//! Loudness inside the band `[silence, talk)` never changes state.

use lipsync_models::{Segment, SegmentKind};
use serde::Serialize;
use tracing::trace;

use crate::envelope::EnvelopeFrame;
use crate::thresholds::Thresholds;

/// Internal state for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Talk,
}

impl State {
    fn kind(self) -> SegmentKind {
        match self {
            State::Idle => SegmentKind::Idle,
            State::Talk => SegmentKind::Talk,
        }
    }
}

/// Converts a stream of envelope windows into merged talk/idle segments.
pub struct HysteresisClassifier {
    thresholds: Thresholds,
    state: State,
    segments: Vec<Segment>,
    current_segment_start: f64,
}

impl HysteresisClassifier {
    /// Create a classifier starting in the idle state.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: State::Idle,
            segments: Vec::new(),
            current_segment_start: 0.0,
        }
    }

    /// Process one envelope window.
    ///
    /// # Arguments
    /// - `loudness`: RMS loudness of the window
    /// - `start`: Window start time in seconds (non-decreasing across calls)
    pub fn ingest_frame(&mut self, loudness: f32, start: f64) {
        let next = match self.state {
            State::Idle if loudness >= self.thresholds.talk => State::Talk,
            State::Talk if loudness < self.thresholds.silence => State::Idle,
            current => current,
        };

        if next == self.state {
            return;
        }

        // A flip on the very first window just fixes the opening kind.
        if start > self.current_segment_start {
            self.push_segment(start);
            self.current_segment_start = start;
        }

        trace!(
            at = start,
            loudness = loudness,
            to = ?next,
            "Classifier state change"
        );
        self.state = next;
    }

    /// Finalize processing and return all segments.
    ///
    /// # Arguments
    /// - `total_duration`: Duration of the input in seconds
    pub fn finalize(mut self, total_duration: f64) -> Vec<Segment> {
        if total_duration > self.current_segment_start {
            self.push_segment(total_duration);
        }
        self.segments
    }

    fn push_segment(&mut self, end: f64) {
        let id = self.segments.len() as u32 + 1;
        self.segments.push(Segment::new(
            id,
            self.state.kind(),
            self.current_segment_start,
            end - self.current_segment_start,
        ));
    }
}

/// Classify a whole envelope spanning `total_duration` seconds.
pub fn classify(
    envelope: &[EnvelopeFrame],
    thresholds: Thresholds,
    total_duration: f64,
) -> Vec<Segment> {
    if envelope.is_empty() || total_duration <= 0.0 {
        return Vec::new();
    }

    let mut classifier = HysteresisClassifier::new(thresholds);
    for frame in envelope {
        classifier.ingest_frame(frame.loudness, frame.start);
    }
    classifier.finalize(total_duration)
}

/// Statistics about talk/idle segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    /// Total duration of talk segments in seconds.
    pub total_talk_secs: f64,
    /// Total duration of idle segments in seconds.
    pub total_idle_secs: f64,
    /// Number of talk segments.
    pub talk_count: usize,
    /// Number of idle segments.
    pub idle_count: usize,
    /// Ratio of talk time (0.0 to 1.0).
    pub talk_ratio: f64,
}

/// Calculate statistics about the segments.
pub fn compute_segment_stats(segments: &[Segment]) -> SegmentStats {
    let mut stats = SegmentStats::default();

    for segment in segments {
        match segment.kind {
            SegmentKind::Talk => {
                stats.total_talk_secs += segment.duration;
                stats.talk_count += 1;
            }
            SegmentKind::Idle => {
                stats.total_idle_secs += segment.duration;
                stats.idle_count += 1;
            }
        }
    }

    let total = stats.total_talk_secs + stats.total_idle_secs;
    stats.talk_ratio = if total > 0.0 {
        stats.total_talk_secs / total
    } else {
        0.0
    };

    stats
}
