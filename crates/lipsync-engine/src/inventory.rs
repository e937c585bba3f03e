//! Caller-owned clip registry.
//!
//! Insertion order is preserved and is part of the planner's determinism:
//! ties between equal-length clips are broken by registration order.

use std::collections::BTreeSet;

use lipsync_models::{ClipId, LoopSize, MotionCategory, MotionClip};

use crate::error::InventoryError;

/// Ordered set of motion clips available to the planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipInventory {
    clips: Vec<MotionClip>,
}

impl ClipInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from clips, validating each in order.
    pub fn from_clips(clips: impl IntoIterator<Item = MotionClip>) -> Result<Self, InventoryError> {
        let mut inventory = Self::new();
        for clip in clips {
            inventory.add(clip)?;
        }
        Ok(inventory)
    }

    /// Register a clip. Durations must be finite and positive.
    pub fn add(&mut self, clip: MotionClip) -> Result<(), InventoryError> {
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            return Err(InventoryError::InvalidDuration {
                clip_id: clip.id,
                duration: clip.duration,
            });
        }
        if self.get(&clip.id).is_some() {
            return Err(InventoryError::DuplicateId(clip.id));
        }
        self.clips.push(clip);
        Ok(())
    }

    /// Remove a clip, returning it.
    pub fn remove(&mut self, id: &ClipId) -> Result<MotionClip, InventoryError> {
        let index = self
            .clips
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| InventoryError::UnknownClip(id.clone()))?;
        Ok(self.clips.remove(index))
    }

    /// Re-tag a clip between planning runs.
    pub fn set_category(
        &mut self,
        id: &ClipId,
        category: MotionCategory,
    ) -> Result<(), InventoryError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| InventoryError::UnknownClip(id.clone()))?;
        clip.category = category;
        Ok(())
    }

    pub fn get(&self, id: &ClipId) -> Option<&MotionClip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    /// Clips of one category in registration order.
    pub fn of_category(&self, category: MotionCategory) -> Vec<&MotionClip> {
        self.clips.iter().filter(|c| c.category == category).collect()
    }

    pub fn speech_loops(&self, size: LoopSize) -> Vec<&MotionClip> {
        self.of_category(MotionCategory::SpeechLoop(size))
    }

    pub fn has_category(&self, category: MotionCategory) -> bool {
        self.clips.iter().any(|c| c.category == category)
    }

    /// Categories with at least one clip.
    pub fn categories(&self) -> BTreeSet<MotionCategory> {
        self.clips.iter().map(|c| c.category).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionClip> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
