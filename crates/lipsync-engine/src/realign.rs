//! Audio realignment onto the video clock.
//!
//! The output buffer is silence for `total_duration` seconds; each talk
//! slice is copied from its audio-domain position to its video-domain start.
//! Idle audio is dropped rather than stretched.

use lipsync_models::{secs_to_frames, DecodedAudio, SegmentId, TalkTiming};
use serde::Serialize;
use tracing::{debug, warn};

use crate::metrics;

/// A talk slice cut short because its video window was shorter than the
/// audio. Non-fatal; reported alongside the realigned buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallTruncation {
    pub segment_id: SegmentId,
    pub audio_duration: f64,
    pub window_duration: f64,
    pub dropped_secs: f64,
}

/// Output of [`realign`].
#[derive(Debug, Clone)]
pub struct Realigned {
    pub audio: DecodedAudio,
    pub shortfalls: Vec<ShortfallTruncation>,
}

impl Realigned {
    pub fn has_shortfalls(&self) -> bool {
        !self.shortfalls.is_empty()
    }
}

/// Move talk audio to its video-domain positions.
///
/// Channel layout and sample rate follow the source. Never writes past a
/// timing's `video_end` or past the end of the output buffer.
pub fn realign(
    audio: &DecodedAudio,
    talk_timings: &[TalkTiming],
    total_duration: f64,
) -> Realigned {
    let rate = audio.sample_rate();
    let channels = audio.channels() as usize;
    let out_frames = secs_to_frames(total_duration, rate);

    let mut output = audio.silent_like(out_frames);
    let mut shortfalls = Vec::new();

    for timing in talk_timings {
        let src_start = audio.frame_at(timing.audio_start);
        let src_end = audio.frame_at(timing.audio_start + timing.audio_duration);
        let source = audio.slice_frames(src_start, src_end);
        let source_frames = source.len() / channels;

        let dst_start = secs_to_frames(timing.video_start, rate).min(out_frames);
        let dst_end = secs_to_frames(timing.video_end, rate).clamp(dst_start, out_frames);
        let copy_frames = source_frames.min(dst_end - dst_start);

        output.samples_mut()[dst_start * channels..(dst_start + copy_frames) * channels]
            .copy_from_slice(&source[..copy_frames * channels]);

        if timing.is_short() {
            let shortfall = ShortfallTruncation {
                segment_id: timing.segment_id,
                audio_duration: timing.audio_duration,
                window_duration: timing.video_duration(),
                dropped_secs: timing.audio_duration - timing.video_duration(),
            };
            warn!(
                segment_id = %shortfall.segment_id,
                audio_duration = shortfall.audio_duration,
                window_duration = shortfall.window_duration,
                dropped_secs = shortfall.dropped_secs,
                "Talk audio truncated to fit video window"
            );
            metrics::record_shortfall();
            shortfalls.push(shortfall);
        }
    }

    debug!(
        source_secs = audio.duration_secs(),
        output_secs = total_duration,
        output_frames = out_frames,
        talk_slices = talk_timings.len(),
        shortfalls = shortfalls.len(),
        "Audio realigned"
    );

    Realigned {
        audio: output,
        shortfalls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn ramp(frames: usize) -> DecodedAudio {
        let samples = (0..frames).map(|i| (i as f32 + 1.0) / frames as f32).collect();
        DecodedAudio::mono(samples, RATE).unwrap()
    }

    fn timing(
        id: u32,
        audio_start: f64,
        audio_duration: f64,
        video_start: f64,
        video_end: f64,
    ) -> TalkTiming {
        TalkTiming {
            segment_id: SegmentId(id),
            video_start,
            video_end,
            audio_start,
            audio_duration,
        }
    }

    #[test]
    fn test_output_length_matches_total() {
        let source = ramp(3000);
        let out = realign(&source, &[timing(2, 1.0, 1.0, 1.0, 2.0)], 3.5);
        assert_eq!(out.audio.frames(), 3500);
        assert_eq!(out.audio.sample_rate(), RATE);
        assert!(!out.has_shortfalls());
    }

    #[test]
    fn test_talk_slice_copied_and_rest_silent() {
        let source = ramp(3000);
        let out = realign(&source, &[timing(2, 1.0, 1.0, 1.4, 2.6)], 4.0);
        let samples = out.audio.samples();

        assert_eq!(&samples[1400..2400], &source.samples()[1000..2000]);
        assert!(samples[..1400].iter().all(|&s| s == 0.0));
        assert!(samples[2400..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stereo_layout_preserved() {
        let planes = vec![vec![0.25; 2000], vec![-0.5; 2000]];
        let source = DecodedAudio::from_planar(&planes, RATE).unwrap();
        let out = realign(&source, &[timing(1, 0.5, 0.5, 1.0, 1.6)], 2.0);

        assert_eq!(out.audio.channels(), 2);
        assert_eq!(out.audio.frames(), 2000);
        assert_eq!(out.audio.slice_frames(1000, 1001), &[0.25, -0.5]);
        assert_eq!(out.audio.slice_frames(1500, 1501), &[0.0, 0.0]);
    }

    #[test]
    fn test_short_window_truncates_without_overrun() {
        let source = DecodedAudio::mono(vec![1.0; 3000], RATE).unwrap();
        let out = realign(&source, &[timing(3, 0.0, 2.0, 0.5, 1.5)], 3.0);
        let samples = out.audio.samples();

        assert!(samples[500..1500].iter().all(|&s| s == 1.0));
        assert!(samples[1500..].iter().all(|&s| s == 0.0));

        assert_eq!(out.shortfalls.len(), 1);
        let shortfall = &out.shortfalls[0];
        assert_eq!(shortfall.segment_id, SegmentId(3));
        assert!((shortfall.dropped_secs - 1.0).abs() < 1e-9);
        assert!((shortfall.window_duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_slice_clamped_to_buffer() {
        let source = DecodedAudio::mono(vec![1.0; 1000], RATE).unwrap();
        let out = realign(&source, &[timing(1, 0.8, 0.5, 0.0, 1.0)], 1.0);
        let samples = out.audio.samples();

        assert!(samples[..200].iter().all(|&s| s == 1.0));
        assert!(samples[200..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_no_timings_gives_silence() {
        let source = ramp(1000);
        let out = realign(&source, &[], 2.0);
        assert_eq!(out.audio.frames(), 2000);
        assert!(out.audio.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_zero_total_gives_empty_buffer() {
        let out = realign(&ramp(1000), &[], 0.0);
        assert!(out.audio.is_empty());
    }
}
