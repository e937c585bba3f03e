//! Windowed loudness envelope.
//!
//! Each window is the RMS of per-frame magnitudes, where a frame's magnitude
//! combines its channels according to [`ChannelMix`]. Windows do not overlap;
//! the final window may be shorter and keeps its true duration.

use lipsync_models::DecodedAudio;
use tracing::trace;

use crate::config::ChannelMix;

/// Loudness of one envelope window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeFrame {
    /// First audio frame covered by this window.
    pub first_frame: usize,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// RMS loudness of the window.
    pub loudness: f32,
}

impl EnvelopeFrame {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Compute the loudness envelope of `audio` with `window_frames` frames per
/// window. Empty audio produces an empty envelope.
pub fn compute_envelope(
    audio: &DecodedAudio,
    window_frames: usize,
    mix: ChannelMix,
) -> Vec<EnvelopeFrame> {
    let window_frames = window_frames.max(1);
    let channels = audio.channels() as usize;
    let rate = audio.sample_rate() as f64;

    let envelope: Vec<EnvelopeFrame> = audio
        .samples()
        .chunks(window_frames * channels)
        .enumerate()
        .map(|(i, window)| {
            let first_frame = i * window_frames;
            let len = window.len() / channels;
            EnvelopeFrame {
                first_frame,
                start: first_frame as f64 / rate,
                duration: len as f64 / rate,
                loudness: window_rms(window, channels, mix),
            }
        })
        .collect();

    trace!(
        windows = envelope.len(),
        window_frames = window_frames,
        "Computed loudness envelope"
    );

    envelope
}

/// RMS of combined magnitudes over one interleaved window.
fn window_rms(window: &[f32], channels: usize, mix: ChannelMix) -> f32 {
    let frames = window.len() / channels;
    if frames == 0 {
        return 0.0;
    }

    let sum_sq: f64 = window
        .chunks_exact(channels)
        .map(|frame| {
            let magnitude = frame_magnitude(frame, mix) as f64;
            magnitude * magnitude
        })
        .sum();

    (sum_sq / frames as f64).sqrt() as f32
}

fn frame_magnitude(frame: &[f32], mix: ChannelMix) -> f32 {
    match mix {
        ChannelMix::Mean => frame.iter().map(|s| s.abs()).sum::<f32>() / frame.len() as f32,
        ChannelMix::Max => frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_audio() {
        let audio = DecodedAudio::mono(vec![], 16000).unwrap();
        assert!(compute_envelope(&audio, 1280, ChannelMix::Mean).is_empty());
    }

    #[test]
    fn test_constant_signal_rms() {
        let audio = DecodedAudio::mono(vec![0.5; 100], 100).unwrap();
        let env = compute_envelope(&audio, 10, ChannelMix::Mean);
        assert_eq!(env.len(), 10);
        for frame in &env {
            assert!((frame.loudness - 0.5).abs() < 1e-6);
            assert!((frame.duration - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_partial_last_window_keeps_true_duration() {
        let audio = DecodedAudio::mono(vec![0.1; 25], 100).unwrap();
        let env = compute_envelope(&audio, 10, ChannelMix::Mean);
        assert_eq!(env.len(), 3);
        assert!((env[2].start - 0.2).abs() < 1e-12);
        assert!((env[2].duration - 0.05).abs() < 1e-12);
        assert!((env[2].end() - audio.duration_secs()).abs() < 1e-12);
    }

    #[test]
    fn test_rms_of_alternating_signal() {
        let samples: Vec<f32> = (0..8).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let audio = DecodedAudio::mono(samples, 8).unwrap();
        let env = compute_envelope(&audio, 8, ChannelMix::Mean);
        assert!((env[0].loudness - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_channel_mix() {
        // Left channel loud, right silent.
        let audio = DecodedAudio::from_interleaved(vec![0.8, 0.0, -0.8, 0.0], 2, 2).unwrap();
        let mean = compute_envelope(&audio, 2, ChannelMix::Mean);
        let max = compute_envelope(&audio, 2, ChannelMix::Max);
        assert!((mean[0].loudness - 0.4).abs() < 1e-6);
        assert!((max[0].loudness - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_phase_inverted_channels_do_not_cancel() {
        let audio = DecodedAudio::from_interleaved(vec![0.5, -0.5, -0.5, 0.5], 2, 2).unwrap();
        let env = compute_envelope(&audio, 2, ChannelMix::Mean);
        assert!((env[0].loudness - 0.5).abs() < 1e-6);
    }
}
