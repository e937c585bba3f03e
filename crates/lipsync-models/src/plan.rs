//! Timeline plan models.
//!
//! A [`TimelinePlan`] is the planner's deliverable: an ordered, gapless list
//! of clip placements in the video domain plus one [`TalkTiming`] per talk
//! segment that the realigner uses to move audio onto the video clock.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MotionClip, SegmentId};

/// Tolerance used when checking plan equalities, in seconds.
pub const PLAN_EPSILON: f64 = 1e-6;

/// One clip placed on the video timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub clip: MotionClip,
    /// Start time in seconds (video domain).
    pub start: f64,
    /// Segment this placement covers.
    pub segment_id: SegmentId,
}

impl Placement {
    pub fn duration(&self) -> f64 {
        self.clip.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.clip.duration
    }
}

/// Audio/video timing of one talk segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TalkTiming {
    pub segment_id: SegmentId,
    pub video_start: f64,
    pub video_end: f64,
    pub audio_start: f64,
    pub audio_duration: f64,
}

impl TalkTiming {
    /// Length of the video window assigned to this utterance.
    pub fn video_duration(&self) -> f64 {
        self.video_end - self.video_start
    }

    /// Accumulated audio/video offset when this utterance starts.
    pub fn drift(&self) -> f64 {
        self.video_start - self.audio_start
    }

    /// True when the assigned clips are shorter than the audio.
    pub fn is_short(&self) -> bool {
        self.audio_duration > self.video_duration() + PLAN_EPSILON
    }
}

/// The complete clip schedule for one recording.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePlan {
    pub placements: Vec<Placement>,
    pub talk_timings: Vec<TalkTiming>,
    /// Total video duration in seconds.
    pub total_duration: f64,
}

impl TimelinePlan {
    /// A plan with nothing scheduled.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placements assigned to one segment, in timeline order.
    pub fn placements_for(&self, segment_id: SegmentId) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.segment_id == segment_id)
    }

    /// Drift at the last utterance, or zero without talk.
    pub fn final_drift(&self) -> f64 {
        self.talk_timings.last().map(TalkTiming::drift).unwrap_or(0.0)
    }

    /// Largest drift over all utterances, or zero without talk.
    pub fn max_drift(&self) -> f64 {
        self.talk_timings
            .iter()
            .map(TalkTiming::drift)
            .fold(0.0, f64::max)
    }

    /// Verify placement contiguity, the total-duration equalities and that
    /// every talk window is exactly the span of its segment's placements.
    pub fn check_invariants(&self) -> Result<(), PlanInvariantError> {
        let Some(first) = self.placements.first() else {
            if self.total_duration.abs() > PLAN_EPSILON || !self.talk_timings.is_empty() {
                return Err(PlanInvariantError::NonEmptyWithoutPlacements);
            }
            return Ok(());
        };

        if first.start.abs() > PLAN_EPSILON {
            return Err(PlanInvariantError::NonZeroStart(first.start));
        }

        for (index, pair) in self.placements.windows(2).enumerate() {
            if (pair[0].end() - pair[1].start).abs() > PLAN_EPSILON {
                return Err(PlanInvariantError::Gap {
                    index: index + 1,
                    expected: pair[0].end(),
                    actual: pair[1].start,
                });
            }
        }

        let summed: f64 = self.placements.iter().map(Placement::duration).sum();
        if (summed - self.total_duration).abs() > PLAN_EPSILON {
            return Err(PlanInvariantError::TotalMismatch {
                total: self.total_duration,
                actual: summed,
            });
        }

        if let Some(last) = self.placements.last() {
            if (last.end() - self.total_duration).abs() > PLAN_EPSILON {
                return Err(PlanInvariantError::TotalMismatch {
                    total: self.total_duration,
                    actual: last.end(),
                });
            }
        }

        for timing in &self.talk_timings {
            let mut placed = self.placements_for(timing.segment_id).peekable();
            let placed_start = placed.peek().map_or(timing.video_start, |p| p.start);
            let placed_end = placed_start + placed.map(Placement::duration).sum::<f64>();
            if (placed_start - timing.video_start).abs() > PLAN_EPSILON
                || (placed_end - timing.video_end).abs() > PLAN_EPSILON
            {
                return Err(PlanInvariantError::TalkWindowMismatch {
                    segment_id: timing.segment_id,
                    video_start: timing.video_start,
                    video_end: timing.video_end,
                    placed_start,
                    placed_end,
                });
            }
        }

        Ok(())
    }
}

/// A violated plan invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanInvariantError {
    #[error("Plan has no placements but a non-zero duration or talk timings")]
    NonEmptyWithoutPlacements,

    #[error("First placement starts at {0:.6}s instead of 0")]
    NonZeroStart(f64),

    #[error("Placement {index} starts at {actual:.6}s, expected {expected:.6}s")]
    Gap {
        index: usize,
        expected: f64,
        actual: f64,
    },

    #[error("Total duration {total:.6}s does not match placements ({actual:.6}s)")]
    TotalMismatch { total: f64, actual: f64 },

    #[error(
        "Talk window of {segment_id} is {video_start:.6}s-{video_end:.6}s \
         but its placements span {placed_start:.6}s-{placed_end:.6}s"
    )]
    TalkWindowMismatch {
        segment_id: SegmentId,
        video_start: f64,
        video_end: f64,
        placed_start: f64,
        placed_end: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MotionCategory, MotionClip};

    fn placement(start: f64, duration: f64, segment: u32) -> Placement {
        Placement {
            clip: MotionClip::new("c", MotionCategory::Idle, duration, "h"),
            start,
            segment_id: SegmentId(segment),
        }
    }

    #[test]
    fn test_empty_plan_is_valid() {
        assert!(TimelinePlan::empty().check_invariants().is_ok());
    }

    #[test]
    fn test_gap_detected() {
        let plan = TimelinePlan {
            placements: vec![placement(0.0, 0.5, 1), placement(0.6, 0.5, 1)],
            talk_timings: vec![],
            total_duration: 1.1,
        };
        assert!(matches!(
            plan.check_invariants(),
            Err(PlanInvariantError::Gap { index: 1, .. })
        ));
    }

    #[test]
    fn test_total_mismatch_detected() {
        let plan = TimelinePlan {
            placements: vec![placement(0.0, 0.5, 1), placement(0.5, 0.5, 1)],
            talk_timings: vec![],
            total_duration: 2.0,
        };
        assert!(matches!(
            plan.check_invariants(),
            Err(PlanInvariantError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn test_drift_helpers() {
        let plan = TimelinePlan {
            placements: vec![],
            talk_timings: vec![
                TalkTiming {
                    segment_id: SegmentId(2),
                    video_start: 1.5,
                    video_end: 2.5,
                    audio_start: 1.0,
                    audio_duration: 0.8,
                },
                TalkTiming {
                    segment_id: SegmentId(4),
                    video_start: 3.2,
                    video_end: 4.2,
                    audio_start: 3.0,
                    audio_duration: 1.2,
                },
            ],
            total_duration: 0.0,
        };
        assert!((plan.max_drift() - 0.5).abs() < 1e-9);
        assert!((plan.final_drift() - 0.2).abs() < 1e-9);
        assert!(!plan.talk_timings[0].is_short());
        assert!(plan.talk_timings[1].is_short());
    }

    #[test]
    fn test_placements_for_segment() {
        let plan = TimelinePlan {
            placements: vec![
                placement(0.0, 0.5, 1),
                placement(0.5, 0.5, 2),
                placement(1.0, 0.5, 2),
            ],
            talk_timings: vec![],
            total_duration: 1.5,
        };
        assert_eq!(plan.placements_for(SegmentId(2)).count(), 2);
        assert!(plan.check_invariants().is_ok());
    }

    fn talk_plan(video_end: f64) -> TimelinePlan {
        TimelinePlan {
            placements: vec![
                placement(0.0, 0.5, 1),
                placement(0.5, 0.3, 2),
                placement(0.8, 0.4, 2),
                placement(1.2, 0.5, 3),
            ],
            talk_timings: vec![TalkTiming {
                segment_id: SegmentId(2),
                video_start: 0.5,
                video_end,
                audio_start: 0.5,
                audio_duration: 0.7,
            }],
            total_duration: 1.7,
        }
    }

    #[test]
    fn test_talk_window_matches_placements() {
        assert!(talk_plan(1.2).check_invariants().is_ok());
    }

    #[test]
    fn test_talk_window_mismatch_detected() {
        let err = talk_plan(1.5).check_invariants().unwrap_err();
        assert!(matches!(
            err,
            PlanInvariantError::TalkWindowMismatch { segment_id: SegmentId(2), .. }
        ));
        assert!(err.to_string().contains("seg-2"));

        let mut plan = talk_plan(1.2);
        plan.talk_timings[0].video_start = 0.0;
        assert!(matches!(
            plan.check_invariants(),
            Err(PlanInvariantError::TalkWindowMismatch { .. })
        ));
    }
}
