//! Configuration for segmentation and planning.
//!
//! These parameters control how the loudness envelope is built, where the
//! hysteresis thresholds land, and which speech loop size the planner prefers.
//! The defaults are tuned for single-speaker narration or TTS output.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How channels are combined into one magnitude per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMix {
    /// Mean of absolute sample magnitudes across channels.
    #[default]
    Mean,
    /// Largest absolute sample magnitude across channels.
    Max,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Envelope window length (milliseconds, non-overlapping).
    ///
    /// - 40ms: Follows short syllables, more segments
    /// - Default (80ms): Word-level granularity
    /// - 120ms+: Only phrase-level pauses split talk
    pub window_ms: u32,

    /// Channel combination before windowing.
    pub channel_mix: ChannelMix,

    /// Envelope quantile taken as the quiet end of the recording (0.0-1.0).
    pub floor_percentile: f32,

    /// Envelope quantile taken as the loud end of the recording (0.0-1.0).
    pub peak_percentile: f32,

    /// Position of the talk threshold between floor and peak (0.0-1.0).
    pub talk_ratio: f32,

    /// Position of the silence threshold between floor and peak.
    ///
    /// Always kept below `talk_ratio`; the gap between the two is the
    /// hysteresis band.
    pub silence_ratio: f32,

    /// Absolute lower bound for the talk threshold (RMS, 0.01 ≈ -40 dBFS).
    ///
    /// Keeps room noise in an otherwise silent recording from reading as talk.
    pub min_talk_level: f32,

    /// Loop coverage (seconds) at or above which large speech loops are
    /// preferred over small ones.
    pub large_loop_min_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_ms: 80,
            channel_mix: ChannelMix::Mean,
            floor_percentile: 0.10,
            peak_percentile: 0.95,
            talk_ratio: 0.50,
            silence_ratio: 0.20,
            min_talk_level: 0.01,
            large_loop_min_secs: 1.5,
        }
    }
}

impl EngineConfig {
    /// Shorter windows and a lower talk threshold, for fast, clipped speech.
    pub fn responsive() -> Self {
        Self {
            window_ms: 40,
            talk_ratio: 0.40,
            silence_ratio: 0.15,
            large_loop_min_secs: 1.0,
            ..Self::default()
        }
    }

    /// Longer windows and a wider hysteresis band, for noisy recordings.
    pub fn steady() -> Self {
        Self {
            window_ms: 120,
            talk_ratio: 0.60,
            silence_ratio: 0.20,
            large_loop_min_secs: 2.0,
            ..Self::default()
        }
    }

    /// Builder-style setter for the envelope window.
    pub fn with_window_ms(mut self, ms: u32) -> Self {
        self.window_ms = ms.max(1);
        self
    }

    /// Builder-style setter for channel combination.
    pub fn with_channel_mix(mut self, mix: ChannelMix) -> Self {
        self.channel_mix = mix;
        self
    }

    /// Builder-style setter for the threshold ratios.
    ///
    /// Both are clamped to `[0, 1]`; if `silence` is not below `talk` it is
    /// pulled down to `talk * 0.4`.
    pub fn with_ratios(mut self, talk: f32, silence: f32) -> Self {
        let talk = talk.clamp(0.0, 1.0);
        let mut silence = silence.clamp(0.0, 1.0);
        if silence >= talk {
            silence = talk * 0.4;
        }
        self.talk_ratio = talk;
        self.silence_ratio = silence;
        self
    }

    /// Builder-style setter for the envelope quantiles.
    pub fn with_percentiles(mut self, floor: f32, peak: f32) -> Self {
        let floor = floor.clamp(0.0, 1.0);
        self.floor_percentile = floor;
        self.peak_percentile = peak.clamp(floor, 1.0);
        self
    }

    /// Builder-style setter for the absolute talk floor.
    pub fn with_min_talk_level(mut self, level: f32) -> Self {
        self.min_talk_level = level.max(f32::MIN_POSITIVE);
        self
    }

    /// Builder-style setter for the large loop preference.
    pub fn with_large_loop_min_secs(mut self, secs: f64) -> Self {
        self.large_loop_min_secs = secs.max(0.0);
        self
    }

    /// Check a configuration that did not come through the setters, such as
    /// one deserialized from a job manifest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        check_range("floor_percentile", self.floor_percentile as f64, 0.0, 1.0)?;
        check_range("peak_percentile", self.peak_percentile as f64, 0.0, 1.0)?;
        check_range("talk_ratio", self.talk_ratio as f64, 0.0, 1.0)?;
        check_range("silence_ratio", self.silence_ratio as f64, 0.0, 1.0)?;
        check_range("min_talk_level", self.min_talk_level as f64, f32::MIN_POSITIVE as f64, 1.0)?;
        check_range("large_loop_min_secs", self.large_loop_min_secs, 0.0, f64::MAX)?;

        if self.silence_ratio >= self.talk_ratio {
            return Err(ConfigError::RatioOrder {
                talk: self.talk_ratio,
                silence: self.silence_ratio,
            });
        }
        if self.peak_percentile < self.floor_percentile {
            return Err(ConfigError::PercentileOrder {
                floor: self.floor_percentile,
                peak: self.peak_percentile,
            });
        }
        Ok(())
    }

    /// Number of audio frames in one envelope window at `sample_rate`.
    pub fn window_frames(&self, sample_rate: u32) -> usize {
        let frames = (sample_rate as u64 * self.window_ms as u64 + 500) / 1000;
        frames.max(1) as usize
    }
}

/// NaN fails every range.
fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
