// src/core/visualization/plot.rs
//
// Tapping plot: waveform with expected-beat and detected-tap overlays,
// rendered to PNG for per-participant inspection.

use anyhow::Result;
use image::{ImageBuffer, Rgb};
use std::path::Path;

use crate::core::scoring::AlignmentVerdict;

/// Tapping plot layout
#[derive(Debug, Clone)]
pub struct TapPlotConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for TapPlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 400,
        }
    }
}

const BACKGROUND: Rgb<u8> = Rgb([16, 16, 24]);
const WAVEFORM: Rgb<u8> = Rgb([110, 110, 130]);
const MATCHED_BEAT: Rgb<u8> = Rgb([60, 200, 90]);
const MISSED_BEAT: Rgb<u8> = Rgb([220, 60, 60]);
const TAP_TICK: Rgb<u8> = Rgb([240, 240, 240]);
const EXTRA_TAP: Rgb<u8> = Rgb([230, 190, 60]);

/// Render one trial's tapping plot
pub fn render_tap_plot(
    samples: &[f32],
    sample_rate: u32,
    verdict: &AlignmentVerdict,
    config: &TapPlotConfig,
    output_path: &Path,
) -> Result<()> {
    let width = config.width.max(16);
    let height = config.height.max(16);
    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);

    let duration_secs = if sample_rate > 0 {
        samples.len() as f64 / sample_rate as f64
    } else {
        0.0
    };

    if !samples.is_empty() {
        draw_waveform(&mut img, samples, width, height);
    }

    let x_of = |t: f64| -> Option<u32> {
        if duration_secs <= 0.0 {
            return None;
        }
        let x = (t / duration_secs * width as f64) as i64;
        if (0..width as i64).contains(&x) {
            Some(x as u32)
        } else {
            None
        }
    };

    // Expected beats: full-height lines, colored by outcome
    for m in &verdict.matches {
        if let Some(x) = x_of(m.expected_secs) {
            let color = if m.is_matched() { MATCHED_BEAT } else { MISSED_BEAT };
            draw_vline(&mut img, x, 0, height, color);
        }
    }

    // Detected taps: ticks along the bottom quarter
    for m in &verdict.matches {
        if let Some(t) = m.detected_secs {
            if let Some(x) = x_of(t) {
                draw_vline(&mut img, x, height * 3 / 4, height, TAP_TICK);
            }
        }
    }
    for &t in &verdict.extras_secs {
        if let Some(x) = x_of(t) {
            draw_vline(&mut img, x, height * 3 / 4, height, EXTRA_TAP);
        }
    }

    img.save(output_path)?;
    Ok(())
}

fn draw_waveform(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, samples: &[f32], width: u32, height: u32) {
    let mid = height as f32 / 2.0;
    let scale = height as f32 / 2.2;
    let per_column = (samples.len() as f64 / width as f64).max(1.0);

    for x in 0..width {
        let start = (x as f64 * per_column) as usize;
        let end = (((x + 1) as f64 * per_column) as usize).min(samples.len());
        if start >= end {
            continue;
        }

        let (mut lo, mut hi) = (f32::MAX, f32::MIN);
        for &s in &samples[start..end] {
            lo = lo.min(s);
            hi = hi.max(s);
        }

        let y0 = (mid - hi * scale).clamp(0.0, (height - 1) as f32) as u32;
        let y1 = (mid - lo * scale).clamp(0.0, (height - 1) as f32) as u32;
        draw_vline(img, x, y0, y1 + 1, WAVEFORM);
    }
}

fn draw_vline(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    let (width, height) = img.dimensions();
    if x >= width {
        return;
    }
    for y in y0..y1.min(height) {
        img.put_pixel(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::FailureReason;
    use crate::core::stimulus::StimulusDescriptor;

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trial.png");

        let descriptor =
            StimulusDescriptor::new("t", "t.wav", 44_100, 2.0, 0.0, vec![0.5, 1.0, 1.5], vec![])
                .unwrap();
        let verdict = AlignmentVerdict::failure(&descriptor, FailureReason::NoTapsDetected);
        let samples = vec![0.0f32; 44_100 * 2];

        render_tap_plot(&samples, 44_100, &verdict, &TapPlotConfig::default(), &path).unwrap();
        assert!(path.exists());
        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 1200);
    }

    #[test]
    fn test_render_tolerates_empty_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let descriptor =
            StimulusDescriptor::new("t", "t.wav", 44_100, 2.0, 0.0, vec![0.5], vec![]).unwrap();
        let verdict = AlignmentVerdict::failure(&descriptor, FailureReason::DecodeFailed);

        render_tap_plot(&[], 44_100, &verdict, &TapPlotConfig::default(), &path).unwrap();
        assert!(path.exists());
    }
}
