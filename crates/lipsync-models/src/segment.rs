//! Talk/idle segment models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a segment within one analysis run (1-indexed, in order).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg-{}", self.0)
    }
}

/// Whether sound is present in a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// No lip-sync constraint; covered by idle clips.
    Idle,
    /// Sound present; covered by transition + speech loop clips.
    Talk,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Idle => "idle",
            SegmentKind::Talk => "talk",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified interval of the source audio, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: SegmentId,
    pub kind: SegmentKind,
    /// Start time in seconds (audio domain).
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl Segment {
    pub fn new(id: u32, kind: SegmentKind, start: f64, duration: f64) -> Self {
        Self {
            id: SegmentId(id),
            kind,
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_talk(&self) -> bool {
        self.kind == SegmentKind::Talk
    }
}
