//! Clip selection for a target duration.
//!
//! Greedy, deterministic cover: while the remaining gap is larger than every
//! candidate, take the longest candidate; once some candidate fits, take the
//! shortest one that does and stop. This uses the minimum number of clips
//! (`ceil(target / longest)`) and keeps the overshoot on the final clip as
//! small as possible. Ties go to the earliest registered clip.

use lipsync_models::{LoopSize, MotionCategory, MotionClip};
use tracing::trace;

use crate::error::{EngineError, EngineResult};
use crate::inventory::ClipInventory;

/// Coverage is complete once within this many seconds of the target, so
/// float residue (`1.0 - 0.3 - 0.3`) never adds a spurious clip.
pub const COVER_EPSILON: f64 = 1e-6;

/// Picks clips from an inventory for one planning run.
#[derive(Debug, Clone, Copy)]
pub struct ClipSelector<'a> {
    inventory: &'a ClipInventory,
}

impl<'a> ClipSelector<'a> {
    pub fn new(inventory: &'a ClipInventory) -> Self {
        Self { inventory }
    }

    /// Clips of `category` whose durations sum to at least `target` seconds.
    ///
    /// Always returns at least one clip, even for a zero target.
    pub fn select(
        &self,
        category: MotionCategory,
        target: f64,
    ) -> EngineResult<Vec<&'a MotionClip>> {
        let candidates = self.inventory.of_category(category);
        if candidates.is_empty() {
            return Err(EngineError::missing_category(category));
        }
        let chosen = cover(&candidates, target);

        trace!(
            category = %category,
            target = target,
            clips = chosen.len(),
            "Selected clips"
        );

        Ok(chosen)
    }

    /// Speech loops covering `target`, preferring `preferred` size.
    ///
    /// Large and small loops are one family: if the preferred size has no
    /// clips the other size is used. Only when neither exists does this fail,
    /// reporting the preferred category.
    pub fn select_speech_loops(
        &self,
        preferred: LoopSize,
        target: f64,
    ) -> EngineResult<(LoopSize, Vec<&'a MotionClip>)> {
        for size in [preferred, preferred.other()] {
            let candidates = self.inventory.speech_loops(size);
            if !candidates.is_empty() {
                let chosen = cover(&candidates, target);
                trace!(
                    preferred = ?preferred,
                    used = ?size,
                    target = target,
                    clips = chosen.len(),
                    "Selected speech loops"
                );
                return Ok((size, chosen));
            }
        }
        Err(EngineError::missing_category(MotionCategory::SpeechLoop(preferred)))
    }
}

/// Greedy cover of `target` seconds. `candidates` must be non-empty with
/// positive durations (guaranteed by [`ClipInventory::add`]).
fn cover<'a>(candidates: &[&'a MotionClip], target: f64) -> Vec<&'a MotionClip> {
    let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
    let mut chosen = Vec::new();
    let mut covered = 0.0;

    loop {
        let remaining = target - covered;

        if let Some(fit) = shortest_fitting(candidates, remaining) {
            chosen.push(fit);
            break;
        }

        let longest = longest(candidates);
        chosen.push(longest);
        covered += longest.duration;

        if covered + COVER_EPSILON >= target {
            break;
        }
    }

    chosen
}

fn shortest_fitting<'a>(candidates: &[&'a MotionClip], remaining: f64) -> Option<&'a MotionClip> {
    let mut best: Option<&'a MotionClip> = None;
    for &clip in candidates {
        if clip.duration + COVER_EPSILON >= remaining
            && best.map_or(true, |b| clip.duration < b.duration)
        {
            best = Some(clip);
        }
    }
    best
}

fn longest<'a>(candidates: &[&'a MotionClip]) -> &'a MotionClip {
    let mut best = candidates[0];
    for &clip in &candidates[1..] {
        if clip.duration > best.duration {
            best = clip;
        }
    }
    best
}

/// Sum of clip durations.
pub fn total_duration(clips: &[&MotionClip]) -> f64 {
    clips.iter().map(|c| c.duration).sum()
}
