//! Timeline planning: segments + clip inventory to a clip schedule.
//!
//! Segments are walked left to right with two cursors. `audio_cursor`
//! advances by each segment's audio duration; `video_cursor` advances by the
//! total duration of the clips placed for it. Video timing is authoritative:
//! every segment starts at the current `video_cursor`, so surplus clip time
//! accumulates as drift and is never caught up.
//!
//! ```text
//! audio  |--idle--|--talk--|---idle---|--talk--|
//! video  |--idle---|in|loop|loop|out|--idle----|in|loop|out|
//!                  ^ videoStart      ^ videoEnd
//! ```

use lipsync_models::{
    LoopSize, MotionCategory, MotionClip, Placement, Segment, SegmentId, SegmentKind, TalkTiming,
    TimelinePlan,
};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::inventory::ClipInventory;
use crate::metrics;
use crate::selector::{total_duration, ClipSelector};

/// Builds a [`TimelinePlan`] for one run.
pub struct TimelinePlanner<'a> {
    selector: ClipSelector<'a>,
    large_loop_min_secs: f64,
    placements: Vec<Placement>,
    talk_timings: Vec<TalkTiming>,
    video_cursor: f64,
    audio_cursor: f64,
}

impl<'a> TimelinePlanner<'a> {
    pub fn new(inventory: &'a ClipInventory, config: &EngineConfig) -> Self {
        Self {
            selector: ClipSelector::new(inventory),
            large_loop_min_secs: config.large_loop_min_secs,
            placements: Vec::new(),
            talk_timings: Vec::new(),
            video_cursor: 0.0,
            audio_cursor: 0.0,
        }
    }

    /// Plan all segments. Fails on the first missing category without
    /// returning any partial plan.
    pub fn plan(mut self, segments: &[Segment]) -> EngineResult<TimelinePlan> {
        for segment in segments {
            let result = match segment.kind {
                SegmentKind::Idle => self.plan_idle(segment),
                SegmentKind::Talk => self.plan_talk(segment),
            };
            if let Err(err) = result {
                metrics::record_missing_category(err.category());
                debug!(
                    segment_id = %segment.id,
                    category = %err.category(),
                    "Planning aborted"
                );
                return Err(err);
            }
        }

        let plan = TimelinePlan {
            placements: self.placements,
            talk_timings: self.talk_timings,
            total_duration: self.video_cursor,
        };

        metrics::record_plan(&plan);
        debug!(
            segments = segments.len(),
            placements = plan.placements.len(),
            talk_segments = plan.talk_timings.len(),
            audio_secs = self.audio_cursor,
            video_secs = plan.total_duration,
            final_drift = plan.final_drift(),
            "Timeline plan complete"
        );

        Ok(plan)
    }

    fn plan_idle(&mut self, segment: &Segment) -> EngineResult<()> {
        let clips = self.selector.select(MotionCategory::Idle, segment.duration)?;
        self.append(&clips, segment.id);
        self.audio_cursor += segment.duration;
        Ok(())
    }

    fn plan_talk(&mut self, segment: &Segment) -> EngineResult<()> {
        // Resolve every category before placing anything.
        let intro = self.selector.select(MotionCategory::IdleToSpeech, 0.0)?;
        let outro = match self.selector.select(MotionCategory::SpeechToIdle, 0.0) {
            Ok(outro) => outro,
            Err(err) => {
                // Loops come before the outro in sequence order.
                self.selector.select_speech_loops(LoopSize::Small, 0.0)?;
                return Err(err);
            }
        };

        let loop_target =
            (segment.duration - total_duration(&intro) - total_duration(&outro)).max(0.0);
        let (size, loops) = self
            .selector
            .select_speech_loops(self.preferred_loop(loop_target), loop_target)?;
        trace!(
            segment_id = %segment.id,
            loop_size = ?size,
            loop_target = loop_target,
            "Loop size chosen"
        );

        let video_start = self.video_cursor;
        self.append(&intro, segment.id);
        self.append(&loops, segment.id);
        self.append(&outro, segment.id);

        self.talk_timings.push(TalkTiming {
            segment_id: segment.id,
            video_start,
            video_end: self.video_cursor,
            audio_start: self.audio_cursor,
            audio_duration: segment.duration,
        });

        trace!(
            segment_id = %segment.id,
            audio_start = self.audio_cursor,
            video_start = video_start,
            video_end = self.video_cursor,
            drift = video_start - self.audio_cursor,
            "Talk segment placed"
        );

        self.audio_cursor += segment.duration;
        Ok(())
    }

    fn preferred_loop(&self, loop_target: f64) -> LoopSize {
        if loop_target >= self.large_loop_min_secs {
            LoopSize::Large
        } else {
            LoopSize::Small
        }
    }

    fn append(&mut self, clips: &[&MotionClip], segment_id: SegmentId) {
        for &clip in clips {
            self.placements.push(Placement {
                clip: clip.clone(),
                start: self.video_cursor,
                segment_id,
            });
            self.video_cursor += clip.duration;
        }
    }
}

/// Plan `segments` against `inventory`.
pub fn plan(
    segments: &[Segment],
    inventory: &ClipInventory,
    config: &EngineConfig,
) -> EngineResult<TimelinePlan> {
    TimelinePlanner::new(inventory, config).plan(segments)
}
