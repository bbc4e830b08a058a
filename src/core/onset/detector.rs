// src/core/onset/detector.rs
//
// Energy-envelope tap onset detection with a refractory interval.

use log::debug;

use super::{spectral_flux, OnsetSet};
use crate::config::{DetectionMethod, OnsetParams};
use crate::core::dsp::{envelope, filters::dc_block, median};

/// Per-sample envelope follower coefficients. Fast attack so the gate
/// crossing lands within a millisecond of the physical tap, release fast
/// enough that the envelope clears the gate between taps at fast tempi.
const ENV_ATTACK: f32 = 0.05;
const ENV_RELEASE: f32 = 0.002;

/// DC blocker pole
const DC_POLE: f32 = 0.995;

/// Tap onset detector
pub struct OnsetDetector {
    params: OnsetParams,
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl OnsetDetector {
    pub fn new() -> Self {
        Self {
            params: OnsetParams::default(),
        }
    }

    pub fn with_params(params: OnsetParams) -> Self {
        Self { params }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.params.threshold = threshold;
        self
    }

    pub fn with_noise_gate(mut self, gate: f32) -> Self {
        self.params.noise_gate = gate;
        self
    }

    pub fn with_refractory_secs(mut self, refractory: f64) -> Self {
        self.params.refractory_secs = refractory;
        self
    }

    pub fn params(&self) -> &OnsetParams {
        &self.params
    }

    /// Extract tap onsets from a mono waveform
    ///
    /// Silence and sub-gate noise produce an empty set, never an error.
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> OnsetSet {
        if samples.is_empty() || sample_rate == 0 {
            return OnsetSet::empty();
        }

        let onsets = match self.params.method {
            DetectionMethod::EnergyEnvelope => self.detect_envelope(samples, sample_rate),
            DetectionMethod::SpectralFlux => {
                spectral_flux::detect(samples, sample_rate, &self.params)
            }
        };

        debug!(
            "detected {} onset(s) in {:.2}s of audio",
            onsets.len(),
            samples.len() as f64 / sample_rate as f64
        );

        OnsetSet::from_times(onsets)
    }

    fn detect_envelope(&self, samples: &[f32], sample_rate: u32) -> Vec<f64> {
        let filtered = dc_block(samples, DC_POLE);
        let env = envelope(&filtered, ENV_ATTACK, ENV_RELEASE);

        // Noise-floor gate: median of the envelope with headroom, but
        // never below the configured gate
        let mut scratch = env.clone();
        let floor = median(&mut scratch);
        let gate = self.params.noise_gate.max(floor * 3.0);

        let rise_span = ((self.params.rise_window_secs * sample_rate as f64) as usize).max(1);
        let lookahead = rise_span * 4;
        let refractory = (self.params.refractory_secs * sample_rate as f64) as usize;

        let mut onsets = Vec::new();
        let mut last_onset: Option<usize> = None;

        for i in 1..env.len() {
            if env[i] <= gate || env[i - 1] > gate {
                continue;
            }

            // Upward gate crossing. Require a genuine transient: the
            // envelope must climb by at least `threshold` from just
            // before the crossing to its local peak.
            let before = env[i.saturating_sub(rise_span)];
            let ahead_end = (i + lookahead).min(env.len());
            let peak = env[i..ahead_end].iter().fold(0.0f32, |a, &b| a.max(b));
            if peak - before < self.params.threshold {
                continue;
            }

            // Refractory interval: earliest onset wins
            if let Some(last) = last_onset {
                if i - last < refractory {
                    continue;
                }
            }

            onsets.push(i as f64 / sample_rate as f64);
            last_onset = Some(i);
        }

        onsets
    }
}
