//! Sample-rate conversion for stimulus preparation
//!
//! Prepared stimuli are written at one fixed rate regardless of the rate
//! the source material was delivered at.

use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::PreparationError;

const CHUNK_SIZE: usize = 1024;

/// Resample a mono signal from one rate to another
///
/// Output is delay-compensated and trimmed to the expected length so that
/// event times in seconds are preserved across the conversion.
pub fn resample_mono(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, PreparationError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    debug!(
        "resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.1, params, CHUNK_SIZE, 1)
        .map_err(|e| PreparationError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let mut out: Vec<f32> = Vec::with_capacity(expected_len + delay);

    let mut pos = 0;
    while pos < samples.len() {
        let frames = resampler.input_frames_next();
        let processed = if pos + frames <= samples.len() {
            let chunk = &samples[pos..pos + frames];
            pos += frames;
            resampler
                .process(&[chunk], None)
                .map_err(|e| PreparationError::Resample(e.to_string()))?
        } else {
            let chunk = &samples[pos..];
            pos = samples.len();
            resampler
                .process_partial(Some(&[chunk]), None)
                .map_err(|e| PreparationError::Resample(e.to_string()))?
        };
        out.extend_from_slice(&processed[0]);
    }

    // Drain the filter tail until the delay-compensated output is full
    while out.len() < expected_len + delay {
        let processed = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| PreparationError::Resample(e.to_string()))?;
        if processed[0].is_empty() {
            break;
        }
        out.extend_from_slice(&processed[0]);
    }

    let start = delay.min(out.len());
    let mut trimmed = out.split_off(start);
    trimmed.truncate(expected_len);
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_identity_rate_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        let out = resample_mono(&samples, 44_100, 44_100).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_resample_length_and_tone() {
        // One second of 440 Hz at 48 kHz resampled to 44.1 kHz
        let from = 48_000u32;
        let to = 44_100u32;
        let samples: Vec<f32> = (0..from)
            .map(|n| (2.0 * PI * 440.0 * n as f32 / from as f32).sin() * 0.5)
            .collect();

        let out = resample_mono(&samples, from, to).unwrap();
        assert_eq!(out.len(), to as usize);

        // Energy preserved to within resampler tolerances
        let in_rms = crate::core::dsp::stats::rms(&samples);
        let out_rms = crate::core::dsp::stats::rms(&out[1000..out.len() - 1000]);
        assert!((in_rms - out_rms).abs() < 0.05);
    }
}
