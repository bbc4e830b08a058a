//! Amplitude statistics and envelope extraction

/// Compute moving average
pub fn moving_average(data: &[f32], window_size: usize) -> Vec<f32> {
    if data.len() < window_size || window_size < 2 {
        return data.to_vec();
    }

    let half = window_size / 2;
    let mut result = Vec::with_capacity(data.len());

    for i in 0..data.len() {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(data.len());
        let sum: f32 = data[start..end].iter().sum();
        result.push(sum / (end - start) as f32);
    }

    result
}

/// Compute median of a slice
pub fn median(data: &mut [f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        (data[mid - 1] + data[mid]) / 2.0
    } else {
        data[mid]
    }
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Compute peak amplitude
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert amplitude to dB (relative to 1.0)
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude > 1e-10 {
        20.0 * amplitude.log10()
    } else {
        -200.0
    }
}

/// Fraction of samples at or above the clip threshold
pub fn clipped_fraction(samples: &[f32], clip_threshold: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let clipped = samples
        .iter()
        .filter(|s| s.abs() >= clip_threshold)
        .count();

    clipped as f32 / samples.len() as f32
}

/// Peak-following amplitude envelope with asymmetric attack/release
///
/// Fast attack tracks tap transients, slow release keeps the envelope up
/// long enough for crossing detection. Coefficients are per-sample.
pub fn envelope(samples: &[f32], attack: f32, release: f32) -> Vec<f32> {
    let mut env = Vec::with_capacity(samples.len());
    let mut current = 0.0f32;

    for &sample in samples {
        let abs_sample = sample.abs();
        if abs_sample > current {
            current += attack * (abs_sample - current);
        } else {
            current += release * (abs_sample - current);
        }
        env.push(current);
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        let samples = vec![1.0, -1.0, 1.0, -1.0];
        assert!((rms(&samples) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_median_even_odd() {
        let mut odd = vec![3.0, 1.0, 2.0];
        assert_eq!(median(&mut odd), 2.0);
        let mut even = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut even), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn test_moving_average_preserves_length() {
        let data = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let smoothed = moving_average(&data, 3);
        assert_eq!(smoothed.len(), data.len());
        // Interior values average their neighborhood
        assert!((smoothed[3] - (1.0 + 0.0 + 1.0) / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_clipped_fraction() {
        let samples = vec![0.5, 1.0, -1.0, 0.2];
        assert!((clipped_fraction(&samples, 0.99) - 0.5).abs() < 1e-6);
        assert_eq!(clipped_fraction(&[], 0.99), 0.0);
    }

    #[test]
    fn test_envelope_tracks_burst() {
        let mut samples = vec![0.0f32; 2000];
        for s in samples[500..600].iter_mut() {
            *s = 0.8;
        }
        let env = envelope(&samples, 0.1, 0.001);
        assert!(env[499] < 0.01);
        assert!(env[599] > 0.5);
        // Slow release: still elevated shortly after the burst
        assert!(env[700] > 0.3);
    }
}
