//! Shared data models for the lipsync timeline engine.
//!
//! This crate provides Serde-serializable types for:
//! - Decoded audio buffers handed in by the decode step
//! - Classified talk/idle segments
//! - Motion clips and their categories
//! - Timeline plans (placements and per-utterance timings)

pub mod audio;
pub mod clip;
pub mod plan;
pub mod segment;
pub mod timestamp;

// Re-export common types
pub use audio::{secs_to_frames, AudioError, AudioResult, DecodedAudio};
pub use clip::{ClipHandle, ClipId, LoopSize, MotionCategory, MotionClip, UnknownCategory};
pub use plan::{Placement, PlanInvariantError, TalkTiming, TimelinePlan, PLAN_EPSILON};
pub use segment::{Segment, SegmentId, SegmentKind};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
