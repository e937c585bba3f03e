//! End-to-end runs: synthetic audio through analyze, plan and realign.

use lipsync_models::{
    secs_to_frames, DecodedAudio, LoopSize, MotionCategory, MotionClip, Segment, SegmentKind,
};

use crate::{AlignmentEngine, ClipInventory, EngineConfig, EngineError};

const RATE: u32 = 16000;
const EPS: f64 = 1e-9;

/// One envelope window at the default 80ms.
const WINDOW_SECS: f64 = 0.08;

/// Mono audio that is `level` inside each `(start, end)` burst and silent
/// elsewhere.
fn bursts(total_secs: f64, level: f32, spans: &[(f64, f64)]) -> DecodedAudio {
    noisy_bursts(total_secs, 0.0, level, spans)
}

/// Like [`bursts`], over a constant `noise` floor instead of silence.
fn noisy_bursts(total_secs: f64, noise: f32, level: f32, spans: &[(f64, f64)]) -> DecodedAudio {
    let frames = secs_to_frames(total_secs, RATE);
    // Alternate sign so every span looks like a waveform, not DC.
    let mut samples: Vec<f32> = (0..frames)
        .map(|i| if i % 2 == 0 { noise } else { -noise })
        .collect();
    for &(start, end) in spans {
        let from = secs_to_frames(start, RATE);
        let to = secs_to_frames(end, RATE).min(frames);
        for (offset, sample) in samples[from..to].iter_mut().enumerate() {
            *sample = if offset % 2 == 0 { level } else { -level };
        }
    }
    DecodedAudio::mono(samples, RATE).unwrap()
}

/// Talk segments line up with `spans`, each edge within one window.
fn assert_talk_follows(segments: &[Segment], spans: &[(f64, f64)]) {
    let talk: Vec<_> = segments.iter().filter(|s| s.is_talk()).collect();
    assert_eq!(talk.len(), spans.len(), "talk segments: {:?}", talk);
    for (segment, &(start, end)) in talk.iter().zip(spans) {
        assert!((segment.start - start).abs() <= WINDOW_SECS + EPS, "{:?}", segment);
        assert!((segment.end() - end).abs() <= WINDOW_SECS + EPS, "{:?}", segment);
    }
}

fn clip(id: &str, category: MotionCategory, duration: f64) -> MotionClip {
    MotionClip::new(id, category, duration, format!("clips/{id}.webm"))
}

fn scenario_inventory() -> ClipInventory {
    ClipInventory::from_clips([
        clip("idle", MotionCategory::Idle, 0.5),
        clip("in", MotionCategory::IdleToSpeech, 0.3),
        clip("loop-s", MotionCategory::SpeechLoop(LoopSize::Small), 0.4),
        clip("out", MotionCategory::SpeechToIdle, 0.3),
    ])
    .unwrap()
}

fn assert_contiguous(segments: &[Segment], total: f64) {
    assert!(segments[0].start.abs() < EPS);
    for pair in segments.windows(2) {
        assert!((pair[0].end() - pair[1].start).abs() < EPS);
        assert_ne!(pair[0].kind, pair[1].kind);
    }
    assert!((segments.last().unwrap().end() - total).abs() < EPS);
}

#[test]
fn test_three_second_recording_end_to_end() {
    let audio = bursts(3.0, 0.5, &[(1.0, 2.0)]);
    let engine = AlignmentEngine::default();
    let alignment = engine.run(&audio, &scenario_inventory()).unwrap();

    let segments = &alignment.analysis.segments;
    let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SegmentKind::Idle, SegmentKind::Talk, SegmentKind::Idle]);
    assert_contiguous(segments, 3.0);
    assert!((segments[1].start - 1.0).abs() <= WINDOW_SECS + EPS);
    assert!((segments[1].end() - 2.0).abs() <= WINDOW_SECS + EPS);

    let plan = &alignment.plan;
    plan.check_invariants().unwrap();
    assert_eq!(plan.talk_timings.len(), 1);

    let timing = &plan.talk_timings[0];
    let idle_before: f64 = plan
        .placements_for(segments[0].id)
        .map(|p| p.duration())
        .sum();
    assert!((timing.video_start - idle_before).abs() < EPS);
    assert!((timing.audio_start - segments[1].start).abs() < EPS);
    assert!(timing.video_duration() >= timing.audio_duration - EPS);

    let out = &alignment.realigned;
    assert_eq!(out.audio.frames(), secs_to_frames(plan.total_duration, RATE));
    assert!(out.shortfalls.is_empty());

    let src_start = secs_to_frames(timing.audio_start, RATE);
    let len = secs_to_frames(timing.audio_start + timing.audio_duration, RATE) - src_start;
    let dst_start = secs_to_frames(timing.video_start, RATE);
    assert_eq!(
        out.audio.slice_frames(dst_start, dst_start + len),
        audio.slice_frames(src_start, src_start + len)
    );
    assert!(out.audio.slice_frames(0, dst_start).iter().all(|&s| s == 0.0));
    assert!(out
        .audio
        .slice_frames(dst_start + len, out.audio.frames())
        .iter()
        .all(|&s| s == 0.0));
}

#[test]
fn test_exact_segments_plan_and_realign() {
    let audio = bursts(3.0, 0.5, &[(1.0, 2.0)]);
    let segments = vec![
        Segment::new(1, SegmentKind::Idle, 0.0, 1.0),
        Segment::new(2, SegmentKind::Talk, 1.0, 1.0),
        Segment::new(3, SegmentKind::Idle, 2.0, 1.0),
    ];
    let engine = AlignmentEngine::default();
    let plan = engine.plan(&segments, &scenario_inventory()).unwrap();

    let timing = &plan.talk_timings[0];
    assert!((timing.audio_start - 1.0).abs() < EPS);
    assert!((timing.audio_duration - 1.0).abs() < EPS);
    assert!((timing.video_start - 1.0).abs() < EPS);
    assert!((timing.video_end - 2.0).abs() < EPS);
    assert!((plan.total_duration - 3.0).abs() < EPS);

    let out = engine.realign(&audio, &plan.talk_timings, plan.total_duration);
    assert_eq!(out.audio.frames(), 48000);
    assert_eq!(out.audio.slice_frames(16000, 32000), audio.slice_frames(16000, 32000));
    assert!(out.audio.slice_frames(0, 16000).iter().all(|&s| s == 0.0));
    assert!(out.audio.slice_frames(32000, 48000).iter().all(|&s| s == 0.0));
}

#[test]
fn test_missing_speech_to_idle_fails_run() {
    let audio = bursts(3.0, 0.5, &[(1.0, 2.0)]);
    let inventory = ClipInventory::from_clips([
        clip("idle", MotionCategory::Idle, 0.5),
        clip("in", MotionCategory::IdleToSpeech, 0.3),
        clip("loop-s", MotionCategory::SpeechLoop(LoopSize::Small), 0.4),
    ])
    .unwrap();

    let err = AlignmentEngine::default().run(&audio, &inventory).unwrap_err();
    assert_eq!(err, EngineError::missing_category(MotionCategory::SpeechToIdle));
    assert_eq!(err.category().as_str(), "speechToIdle");
}

#[test]
fn test_empty_audio_gives_empty_outputs() {
    let audio = DecodedAudio::mono(vec![], RATE).unwrap();
    let alignment = AlignmentEngine::default()
        .run(&audio, &ClipInventory::new())
        .unwrap();

    assert!(alignment.analysis.is_empty());
    assert!(alignment.plan.is_empty());
    assert_eq!(alignment.plan.total_duration, 0.0);
    assert!(alignment.realigned.audio.is_empty());
}

#[test]
fn test_silent_recording_needs_only_idle_clips() {
    let audio = DecodedAudio::silence(secs_to_frames(2.2, RATE), RATE, 1).unwrap();
    let inventory = ClipInventory::from_clips([clip("idle", MotionCategory::Idle, 1.0)]).unwrap();
    let alignment = AlignmentEngine::default().run(&audio, &inventory).unwrap();

    assert_eq!(alignment.analysis.segments.len(), 1);
    assert!(alignment.plan.talk_timings.is_empty());
    assert!((alignment.plan.total_duration - 3.0).abs() < EPS);
    assert!(alignment.realigned.audio.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn test_alternating_bursts_segment_properties() {
    let spans = [(0.3, 0.9), (1.5, 1.7), (2.4, 3.6), (4.0, 4.1), (4.6, 5.0)];
    let audio = bursts(5.0, 0.4, &spans);
    let analysis = AlignmentEngine::default().analyze(&audio);

    assert_contiguous(&analysis.segments, 5.0);
    let talk = analysis.segments.iter().filter(|s| s.is_talk()).count();
    assert_eq!(talk, spans.len());
    assert_eq!(analysis.stats.talk_count, talk);
}

#[test]
fn test_drift_never_decreases_across_utterances() {
    let spans = [(0.5, 0.7), (1.2, 1.4), (2.0, 2.3), (3.0, 3.2)];
    let audio = bursts(4.0, 0.5, &spans);
    let alignment = AlignmentEngine::default()
        .run(&audio, &scenario_inventory())
        .unwrap();

    let plan = &alignment.plan;
    assert_eq!(plan.talk_timings.len(), spans.len());
    for pair in plan.talk_timings.windows(2) {
        assert!(pair[1].drift() + EPS >= pair[0].drift());
    }
    assert!(plan.final_drift() > 0.0);
    assert!((plan.max_drift() - plan.final_drift()).abs() < EPS);
    plan.check_invariants().unwrap();
}

#[test]
fn test_run_is_deterministic() {
    let audio = bursts(4.0, 0.5, &[(0.5, 1.4), (2.0, 3.1)]);
    let inventory = ClipInventory::from_clips([
        clip("idle-a", MotionCategory::Idle, 0.5),
        clip("idle-b", MotionCategory::Idle, 1.2),
        clip("in", MotionCategory::IdleToSpeech, 0.3),
        clip("loop-l", MotionCategory::SpeechLoop(LoopSize::Large), 1.0),
        clip("loop-s", MotionCategory::SpeechLoop(LoopSize::Small), 0.4),
        clip("out", MotionCategory::SpeechToIdle, 0.3),
    ])
    .unwrap();
    let engine = AlignmentEngine::new(EngineConfig::responsive());

    let first = engine.run(&audio, &inventory).unwrap();
    for _ in 0..3 {
        let again = engine.run(&audio, &inventory).unwrap();
        assert_eq!(again.analysis, first.analysis);
        assert_eq!(again.plan, first.plan);
        assert_eq!(again.realigned.audio, first.realigned.audio);
    }
}

#[test]
fn test_plan_json_shape() {
    let plan = AlignmentEngine::default()
        .plan(
            &[Segment::new(1, SegmentKind::Talk, 0.0, 0.5)],
            &scenario_inventory(),
        )
        .unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["placements"][1]["clip"]["category"], "speechLoopSmall");
    assert_eq!(json["talkTimings"][0]["segmentId"], 1);

    let parsed: lipsync_models::TimelinePlan = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.placements.len(), plan.placements.len());
    parsed.check_invariants().unwrap();
}

#[test]
fn test_short_utterance_in_long_silence() {
    let spans = [(1.0, 1.3)];
    let audio = bursts(10.0, 0.5, &spans);
    let alignment = AlignmentEngine::default()
        .run(&audio, &scenario_inventory())
        .unwrap();

    let segments = &alignment.analysis.segments;
    let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SegmentKind::Idle, SegmentKind::Talk, SegmentKind::Idle]);
    assert_contiguous(segments, 10.0);
    assert_talk_follows(segments, &spans);
    assert!(alignment.analysis.silence_threshold() > 0.0);

    let plan = &alignment.plan;
    plan.check_invariants().unwrap();
    assert_eq!(plan.talk_timings.len(), 1);
    assert!(plan.talk_timings[0].audio_duration < 0.5);
}

#[test]
fn test_rare_speech_over_noise_floor() {
    let spans = [(2.0, 2.4), (6.0, 6.5)];
    let audio = noisy_bursts(12.0, 0.02, 0.5, &spans);
    let analysis = AlignmentEngine::default().analyze(&audio);

    assert!(analysis.silence_threshold() > 0.02);
    assert!(analysis.talk_threshold() < 0.5);
    assert_contiguous(&analysis.segments, 12.0);
    assert_talk_follows(&analysis.segments, &spans);
}
