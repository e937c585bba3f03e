//! Decoded audio buffers.
//!
//! The decode collaborator produces a [`DecodedAudio`]; the engine only reads
//! it, except for the realigner which builds a fresh buffer of the same
//! format.

use thiserror::Error;

/// Errors raised when constructing a [`DecodedAudio`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("Sample rate must be positive")]
    ZeroSampleRate,

    #[error("Channel count must be positive")]
    ZeroChannels,

    #[error("Sample count {samples} is not a multiple of channel count {channels}")]
    RaggedInterleave { samples: usize, channels: u16 },

    #[error("Planar channel {channel} has {len} samples, expected {expected}")]
    PlanarLengthMismatch {
        channel: usize,
        len: usize,
        expected: usize,
    },
}

/// Result type for audio construction.
pub type AudioResult<T> = Result<T, AudioError>;

/// An immutable, interleaved PCM buffer with its format.
///
/// Samples are `f32` in `[-1.0, 1.0]`. A "frame" is one sample per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl DecodedAudio {
    /// Build from interleaved samples (`L R L R ...` for stereo).
    pub fn from_interleaved(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
    ) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::ZeroSampleRate);
        }
        if channels == 0 {
            return Err(AudioError::ZeroChannels);
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::RaggedInterleave {
                samples: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Build from one buffer per channel. All channels must be the same length.
    pub fn from_planar(planes: &[Vec<f32>], sample_rate: u32) -> AudioResult<Self> {
        if planes.is_empty() {
            return Err(AudioError::ZeroChannels);
        }
        let expected = planes[0].len();
        for (channel, plane) in planes.iter().enumerate() {
            if plane.len() != expected {
                return Err(AudioError::PlanarLengthMismatch {
                    channel,
                    len: plane.len(),
                    expected,
                });
            }
        }

        let mut samples = Vec::with_capacity(expected * planes.len());
        for frame in 0..expected {
            for plane in planes {
                samples.push(plane[frame]);
            }
        }

        Self::from_interleaved(samples, sample_rate, planes.len() as u16)
    }

    /// Mono convenience constructor.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> AudioResult<Self> {
        Self::from_interleaved(samples, sample_rate, 1)
    }

    /// A buffer of `frames` frames of digital silence.
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> AudioResult<Self> {
        Self::from_interleaved(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// Silence with this buffer's rate and channel layout.
    pub fn silent_like(&self, frames: usize) -> Self {
        Self {
            samples: vec![0.0; frames * self.channels as usize],
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds, derived from the frame count.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frame index nearest to `secs`, clamped to `[0, frames]`.
    pub fn frame_at(&self, secs: f64) -> usize {
        secs_to_frames(secs, self.sample_rate).min(self.frames())
    }

    /// Interleaved samples of frames `[start, end)`, clamped to the buffer.
    pub fn slice_frames(&self, start: usize, end: usize) -> &[f32] {
        let frames = self.frames();
        let start = start.min(frames);
        let end = end.clamp(start, frames);
        let ch = self.channels as usize;
        &self.samples[start * ch..end * ch]
    }

    /// Mutable interleaved samples, for filling a buffer built with
    /// [`DecodedAudio::silence`].
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Convert seconds to a frame count at `sample_rate`, rounding to nearest.
pub fn secs_to_frames(secs: f64, sample_rate: u32) -> usize {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * sample_rate as f64).round() as usize
}
