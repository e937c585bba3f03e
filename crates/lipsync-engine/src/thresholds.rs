//! Hysteresis threshold derivation.
//!
//! Thresholds are placed between the quiet end (`floor_percentile`) and the
//! loud end of the observed loudness distribution:
//!
//! ```text
//! talk    = max(floor + talk_ratio    * (peak - floor), min_talk_level)
//! silence =     floor + silence_ratio * (peak - floor)
//! ```
//!
//! `peak` is the `peak_percentile` quantile of the windows louder than
//! `floor + min_talk_level`, so a short utterance in a long quiet recording
//! still defines the loud end. With no such window `peak == floor`.
//!
//! Silence is re-derived as a fraction of the talk band whenever the ratios
//! cannot place it strictly between the floor and talk. Every window at the
//! floor therefore ends a talk run, and `talk > silence` always holds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::envelope::EnvelopeFrame;

/// Fraction of the talk threshold used when ratios cannot provide one.
const FALLBACK_SILENCE_SCALE: f32 = 0.4;

/// Dual thresholds for the talk/idle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Idle -> Talk when loudness >= this.
    pub talk: f32,
    /// Talk -> Idle when loudness < this.
    pub silence: f32,
}

impl Thresholds {
    /// Build explicit thresholds. Returns `None` unless `talk > silence`.
    pub fn new(talk: f32, silence: f32) -> Option<Self> {
        let ordered = talk > silence && silence.is_finite() && talk.is_finite();
        ordered.then_some(Self { talk, silence })
    }

    /// Width of the hysteresis band.
    pub fn band(&self) -> f32 {
        self.talk - self.silence
    }
}

/// Derive thresholds from an envelope using the configured percentile rule.
pub fn derive_thresholds(envelope: &[EnvelopeFrame], config: &EngineConfig) -> Thresholds {
    let min_talk = config.min_talk_level.max(f32::MIN_POSITIVE);
    let mut levels: Vec<f32> = envelope.iter().map(|f| f.loudness).collect();
    if levels.is_empty() {
        return Thresholds {
            talk: min_talk,
            silence: 0.0,
        };
    }
    levels.sort_by(|a, b| a.total_cmp(b));

    let floor = quantile(&levels, config.floor_percentile);
    let loud_start = levels.partition_point(|&level| level <= floor + min_talk);
    let peak = if loud_start < levels.len() {
        quantile(&levels[loud_start..], config.peak_percentile).max(floor)
    } else {
        floor
    };
    let range = peak - floor;

    let talk = (floor + config.talk_ratio * range).max(min_talk);
    let mut silence = floor + config.silence_ratio * range;
    if silence >= talk || (silence <= floor && talk > floor) {
        let scale = if config.talk_ratio > 0.0 {
            config.silence_ratio / config.talk_ratio
        } else {
            FALLBACK_SILENCE_SCALE
        };
        let scale = if scale > 0.0 && scale < 1.0 {
            scale
        } else {
            FALLBACK_SILENCE_SCALE
        };
        silence = if talk > floor {
            floor + (talk - floor) * scale
        } else {
            talk * scale
        };
    }

    debug!(
        floor = floor,
        peak = peak,
        talk_threshold = talk,
        silence_threshold = silence,
        "Derived hysteresis thresholds"
    );

    Thresholds { talk, silence }
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f32], q: f32) -> f32 {
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f32;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
