// src/core/stimulus/markers.rs
//
// Synchronization marker synthesis. Each marker is a short decaying-sine
// click; a group of them is mixed into the head and tail silence of every
// prepared stimulus so the analysis side can locate the playback in a
// recording.

use std::f32::consts::PI;

use crate::config::MarkerParams;

/// Synthesize one marker click at the given rate
///
/// Deterministic: an exponentially decaying sine burst, zero-padded to
/// the configured duration.
pub fn synthesize_marker(params: &MarkerParams, sample_rate: u32) -> Vec<f32> {
    let length = (params.duration_secs * sample_rate as f64).round() as usize;
    let decay_tau = params.duration_secs as f32 / 3.0;

    (0..length)
        .map(|n| {
            let t = n as f32 / sample_rate as f32;
            params.amplitude * (2.0 * PI * params.frequency_hz * t).sin() * (-t / decay_tau).exp()
        })
        .collect()
}

/// Burst start times for one marker group beginning at `group_start_secs`
pub fn marker_group_times(group_start_secs: f64, params: &MarkerParams) -> Vec<f64> {
    (0..params.count)
        .map(|i| group_start_secs + params.start_offset_secs + i as f64 * params.interval_secs)
        .collect()
}

/// Mix a clip into the destination buffer at the given start time
///
/// Samples past the end of the destination are dropped.
pub fn mix_at(dest: &mut [f32], clip: &[f32], start_secs: f64, sample_rate: u32) {
    let start = (start_secs * sample_rate as f64).round() as usize;
    for (n, &s) in clip.iter().enumerate() {
        let idx = start + n;
        if idx >= dest.len() {
            break;
        }
        dest[idx] += s;
    }
}
