// tests/integration_test.rs
//
// End-to-end pipeline tests with synthesized audio: prepare a stimulus
// from a generated music file, synthesize tapping recordings against its
// descriptor, and check the verdicts the analyzer hands back.

use std::f32::consts::PI;
use std::path::Path;
use std::sync::Arc;

use tapcheckr::{
    AnalysisParams, FailureReason, StimulusCache, StimulusDescriptor, StimulusPreparer,
    TapAnalyzer, TappingPreset,
};

const FS: u32 = 44_100;

/// Decaying-sine click, the transient shape of both drum hits and
/// fingertip taps
fn add_click(samples: &mut [f32], time_secs: f64, amplitude: f32) {
    let start = (time_secs * FS as f64) as usize;
    let length = (FS as f64 * 0.03) as usize;
    for n in 0..length {
        let idx = start + n;
        if idx >= samples.len() {
            break;
        }
        let t = n as f32 / FS as f32;
        samples[idx] += amplitude * (2.0 * PI * 1000.0 * t).sin() * (-t / 0.008).exp();
    }
}

fn write_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: FS,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

/// Write a 10s music file with an annotated beat every 800ms
fn write_annotated_music(dir: &Path) -> std::path::PathBuf {
    let wav = dir.join("music_1.wav");
    let beats: Vec<f64> = (0..10).map(|i| 1.0 + i as f64 * 0.8).collect();

    let mut samples = vec![0.0f32; FS as usize * 10];
    // Some tonal content under the beats so the source resembles music
    for (n, s) in samples.iter_mut().enumerate() {
        let t = n as f32 / FS as f32;
        *s = 0.1 * (2.0 * PI * 220.0 * t).sin();
    }
    for &b in &beats {
        add_click(&mut samples, b, 0.7);
    }
    write_wav(&wav, &samples);

    let annotation: String = beats.iter().map(|b| format!("{b}\n")).collect();
    std::fs::write(dir.join("music_1.txt"), annotation).unwrap();
    wav
}

fn tapping_recording(descriptor: &StimulusDescriptor, jitter_ms: &[f64]) -> Vec<f32> {
    let mut samples = vec![0.0f32; (descriptor.duration_secs() * FS as f64) as usize];
    for (i, &beat) in descriptor.onsets_secs().iter().enumerate() {
        let jitter = jitter_ms[i % jitter_ms.len()] / 1000.0;
        add_click(&mut samples, beat + jitter, 0.8);
    }
    samples
}

#[test]
fn test_full_trial_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    // Stage 1: prepare and persist
    let preparer = StimulusPreparer::new();
    let prepared = preparer.prepare("music_1", &source).unwrap();
    let wav_path = dir.path().join("stim_music_1.wav");
    let json_path = dir.path().join("stim_music_1.json");
    preparer.save_waveform(&prepared.waveform, &wav_path).unwrap();
    prepared.descriptor.save_json(&json_path).unwrap();

    // Round trip through the persisted record
    let descriptor = StimulusDescriptor::load_json(&json_path).unwrap();
    assert_eq!(descriptor, prepared.descriptor);
    assert_eq!(descriptor.onsets_secs().len(), 10);

    // Stage 2: a participant who taps within ~30ms of every beat
    let recording_path = dir.path().join("recording.wav");
    let recording = tapping_recording(&descriptor, &[12.0, -18.0, 25.0, -8.0, 30.0]);
    write_wav(&recording_path, &recording);

    let verdict = TapAnalyzer::new().analyze_file(&recording_path, &descriptor);

    assert!(!verdict.failed, "verdict: {verdict:?}");
    assert_eq!(verdict.reason, None);
    assert_eq!(verdict.matches.len(), descriptor.onsets_secs().len());
    assert_eq!(verdict.summary.matched_count, 10);
    assert_eq!(verdict.summary.extra_count, 0);
    assert!(verdict.summary.mean_abs_asynchrony_ms.unwrap() < 60.0);
}

#[test]
fn test_silent_recording_fails_with_no_taps() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let prepared = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    let descriptor = &prepared.descriptor;

    let recording_path = dir.path().join("silence.wav");
    write_wav(
        &recording_path,
        &vec![0.0f32; (descriptor.duration_secs() * FS as f64) as usize],
    );

    let verdict = TapAnalyzer::new().analyze_file(&recording_path, descriptor);

    assert!(verdict.failed);
    assert_eq!(verdict.reason, Some(FailureReason::NoTapsDetected));
    assert_eq!(verdict.matches.len(), descriptor.onsets_secs().len());
    assert!(verdict.matches.iter().all(|m| !m.is_matched()));
}

#[test]
fn test_corrupt_recording_degrades_to_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let prepared = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    let descriptor = &prepared.descriptor;

    let recording_path = dir.path().join("corrupt.wav");
    std::fs::write(&recording_path, b"RIFF but not really").unwrap();

    // Never panics, never propagates: the bad recording becomes data
    let verdict = TapAnalyzer::new().analyze_file(&recording_path, descriptor);
    assert!(verdict.failed);
    assert_eq!(verdict.reason, Some(FailureReason::DecodeFailed));
    assert_eq!(verdict.matches.len(), descriptor.onsets_secs().len());
}

#[test]
fn test_offbeat_tapping_fails_match_rate_but_passes_unconstrained() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let prepared = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    let descriptor = &prepared.descriptor;

    // Every tap lands 400ms off the beat (beats are 800ms apart, so no
    // tap is within the 150ms window of any beat)
    let recording_path = dir.path().join("offbeat.wav");
    let recording = tapping_recording(descriptor, &[400.0]);
    write_wav(&recording_path, &recording);

    let strict = TapAnalyzer::new().analyze_file(&recording_path, descriptor);
    assert!(strict.failed);
    assert_eq!(strict.reason, Some(FailureReason::LowMatchRate));
    assert_eq!(strict.summary.detected_count, 10);

    let free = TapAnalyzer::with_params(AnalysisParams::from_preset(TappingPreset::Unconstrained))
        .analyze_file(&recording_path, descriptor);
    assert!(!free.failed, "verdict: {free:?}");
    assert_eq!(free.summary.detected_count, 10);
}

#[test]
fn test_cache_serves_prepared_stimulus() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let cache = StimulusCache::default();
    let first = cache.get_or_prepare("music_1", &source).unwrap();
    let second = cache.get_or_prepare("music_1", &source).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // The cached descriptor matches a fresh preparation exactly
    let fresh = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    assert_eq!(fresh.descriptor, first.descriptor);
}

#[test]
fn test_plot_rendering_is_side_effect_only() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let prepared = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    let descriptor = &prepared.descriptor;

    let recording_path = dir.path().join("recording.wav");
    let recording = tapping_recording(descriptor, &[10.0]);
    write_wav(&recording_path, &recording);

    let plot_path = dir.path().join("trial.png");
    let with_plot =
        TapAnalyzer::new().analyze_file_with_plot(&recording_path, descriptor, &plot_path);
    let without_plot = TapAnalyzer::new().analyze_file(&recording_path, descriptor);

    assert!(plot_path.exists());
    assert_eq!(with_plot, without_plot);
}

#[test]
fn test_verdict_serializes_for_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_annotated_music(dir.path());

    let prepared = StimulusPreparer::new().prepare("music_1", &source).unwrap();
    let descriptor = &prepared.descriptor;

    let recording_path = dir.path().join("silence.wav");
    write_wav(&recording_path, &vec![0.0f32; FS as usize]);

    let verdict = TapAnalyzer::new().analyze_file(&recording_path, descriptor);
    let json = serde_json::to_string(&verdict).unwrap();

    assert!(json.contains("\"failed\":true"));
    assert!(json.contains("\"no_taps_detected\""));
}
