//! Error types for engine operations.

use lipsync_models::{ClipId, MotionCategory};
use thiserror::Error;

/// Result type for planning operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort a planning run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// No clip is registered for a category the segment sequence needs.
    /// The caller should prompt the user to add one.
    #[error("No clip available for category '{category}'")]
    MissingCategory { category: MotionCategory },
}

impl EngineError {
    /// Create a missing category error.
    pub fn missing_category(category: MotionCategory) -> Self {
        Self::MissingCategory { category }
    }

    /// The category that must be supplied, for user-facing prompts.
    pub fn category(&self) -> MotionCategory {
        match self {
            EngineError::MissingCategory { category } => *category,
        }
    }
}

/// Errors raised while registering clips.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("Clip '{clip_id}' has invalid duration {duration}; must be finite and positive")]
    InvalidDuration { clip_id: ClipId, duration: f64 },

    #[error("Clip '{0}' is already registered")]
    DuplicateId(ClipId),

    #[error("Clip '{0}' is not registered")]
    UnknownClip(ClipId),
}

/// Errors raised by [`EngineConfig::validate`](crate::EngineConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window_ms must be positive")]
    ZeroWindow,

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("silence_ratio ({silence}) must be below talk_ratio ({talk})")]
    RatioOrder { talk: f32, silence: f32 },

    #[error("peak_percentile ({peak}) must not be below floor_percentile ({floor})")]
    PercentileOrder { floor: f32, peak: f32 },
}
