//! Motion clip models.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a motion clip, assigned by the ingestion side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, caller-owned reference to the clip's bytes.
///
/// The engine never dereferences it; the encoder resolves it (a path, a
/// storage key, a blob URL the UI manages).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipHandle(pub String);

impl ClipHandle {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Size attribute of a speech loop clip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LoopSize {
    Large,
    Small,
}

impl LoopSize {
    /// The interchangeable counterpart within the speech-loop family.
    pub fn other(&self) -> LoopSize {
        match self {
            LoopSize::Large => LoopSize::Small,
            LoopSize::Small => LoopSize::Large,
        }
    }
}

/// The role a clip plays in the lip-sync sequence.
///
/// Speech loops are one family with a size attribute so the planner's choice
/// between them is explicit. On the wire every category is a single
/// camelCase string (`"speechLoopLarge"`, `"idleToSpeech"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MotionCategory {
    Idle,
    IdleToSpeech,
    SpeechLoop(LoopSize),
    SpeechToIdle,
}

impl MotionCategory {
    pub const ALL: [MotionCategory; 5] = [
        MotionCategory::Idle,
        MotionCategory::IdleToSpeech,
        MotionCategory::SpeechLoop(LoopSize::Large),
        MotionCategory::SpeechLoop(LoopSize::Small),
        MotionCategory::SpeechToIdle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionCategory::Idle => "idle",
            MotionCategory::IdleToSpeech => "idleToSpeech",
            MotionCategory::SpeechLoop(LoopSize::Large) => "speechLoopLarge",
            MotionCategory::SpeechLoop(LoopSize::Small) => "speechLoopSmall",
            MotionCategory::SpeechToIdle => "speechToIdle",
        }
    }

    pub fn is_speech_loop(&self) -> bool {
        matches!(self, MotionCategory::SpeechLoop(_))
    }
}

impl fmt::Display for MotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognized category string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown motion category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for MotionCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotionCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl From<MotionCategory> for String {
    fn from(category: MotionCategory) -> Self {
        category.as_str().to_string()
    }
}

impl TryFrom<String> for MotionCategory {
    type Error = UnknownCategory;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl JsonSchema for MotionCategory {
    fn schema_name() -> String {
        "MotionCategory".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.enum_values = Some(
            MotionCategory::ALL
                .iter()
                .map(|c| serde_json::Value::from(c.as_str()))
                .collect(),
        );
        schema.into()
    }
}

/// A short, fixed-length video clip available to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MotionClip {
    pub id: ClipId,
    pub category: MotionCategory,
    /// Duration in seconds.
    pub duration: f64,
    pub handle: ClipHandle,
}

impl MotionClip {
    pub fn new(
        id: impl Into<String>,
        category: MotionCategory,
        duration: f64,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            id: ClipId(id.into()),
            category,
            duration,
            handle: ClipHandle(handle.into()),
        }
    }
}
