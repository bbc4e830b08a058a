// src/config/params.rs
//
// Tunable parameters for stimulus preparation and tapping analysis.
// Every numeric threshold in the pipeline lives here; the presets mirror
// the configurations the hosting experiments actually run with.

use serde::{Deserialize, Serialize};

/// Named parameter presets for common experiment setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TappingPreset {
    /// Sensorimotor synchronization: tap along to a beat grid, scored
    /// against it
    SmsTapping,
    /// Free tapping: onsets are extracted and summarized but the beat
    /// grid never fails the trial
    Unconstrained,
}

impl TappingPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sms" | "sms_tapping" => Some(Self::SmsTapping),
            "unconstrained" | "free" => Some(Self::Unconstrained),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SmsTapping => "sms_tapping",
            Self::Unconstrained => "unconstrained",
        }
    }
}

/// How the scorer treats the expected beat grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Score taps against the beat grid; low match rate fails the trial
    BeatAlignment,
    /// Extract and summarize taps only; only unusable or empty
    /// recordings fail the trial
    TappingOnly,
}

/// Onset detection method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// Attack/release energy envelope with gated upward-crossing peak
    /// picking (default)
    EnergyEnvelope,
    /// Rectified spectral flux over Hann-windowed frames with an
    /// adaptive median threshold
    SpectralFlux,
}

/// Synchronization marker layout embedded into prepared stimuli
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerParams {
    /// Number of marker bursts in each group (head and tail)
    pub count: usize,
    /// Spacing between consecutive marker burst starts, seconds
    pub interval_secs: f64,
    /// Length of one marker burst, seconds
    pub duration_secs: f64,
    /// Carrier frequency of the marker click, Hz
    pub frequency_hz: f32,
    /// Peak amplitude of the marker click
    pub amplitude: f32,
    /// Silence before the first marker of a group, seconds
    pub start_offset_secs: f64,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            count: 3,
            interval_secs: 0.28,
            duration_secs: 0.015,
            frequency_hz: 330.0,
            amplitude: 0.9,
            start_offset_secs: 0.25,
        }
    }
}

impl MarkerParams {
    /// Total span of one marker group from its first burst start to the
    /// end of its last burst, seconds
    pub fn group_span_secs(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.count - 1) as f64 * self.interval_secs + self.duration_secs
    }
}

/// Onset detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnsetParams {
    pub method: DetectionMethod,
    /// Minimum envelope rise across the rise window to accept an onset
    pub threshold: f32,
    /// Envelope level below which activity is treated as background
    /// noise
    pub noise_gate: f32,
    /// Minimum spacing between accepted onsets, seconds (earliest wins)
    pub refractory_secs: f64,
    /// Span over which the envelope rise is measured, seconds
    pub rise_window_secs: f64,
}

impl Default for OnsetParams {
    fn default() -> Self {
        Self {
            method: DetectionMethod::EnergyEnvelope,
            threshold: 0.02,
            noise_gate: 0.005,
            refractory_secs: 0.1,
            rise_window_secs: 0.005,
        }
    }
}

/// Alignment scoring thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringParams {
    pub mode: AnalysisMode,
    /// Symmetric match window around each expected onset, seconds
    pub tolerance_secs: f64,
    /// Minimum fraction of expected onsets that must be matched
    pub min_match_rate: f64,
    /// Minimum number of detected taps for a scorable trial
    pub min_taps: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::BeatAlignment,
            tolerance_secs: 0.15,
            min_match_rate: 0.5,
            min_taps: 3,
        }
    }
}

/// Stimulus preparation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StimulusParams {
    /// Fixed sample rate of prepared stimuli, Hz
    pub sample_rate: u32,
    /// Silence (containing the head marker group) before the music,
    /// seconds
    pub lead_in_secs: f64,
    /// Silence (containing the tail marker group) after the music,
    /// seconds
    pub tail_secs: f64,
    /// Minimum usable music length, seconds
    pub min_music_secs: f64,
    /// Minimum number of beats for a usable grid
    pub min_beats: usize,
    pub marker: MarkerParams,
    /// Detector used for the beat-grid fallback when no annotation file
    /// is present
    pub beat_fallback: OnsetParams,
}

impl Default for StimulusParams {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            lead_in_secs: 3.5,
            tail_secs: 3.5,
            min_music_secs: 5.0,
            min_beats: 2,
            marker: MarkerParams::default(),
            beat_fallback: OnsetParams::default(),
        }
    }
}

/// Complete analysis-stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub onset: OnsetParams,
    pub scoring: ScoringParams,
    /// Absolute sample level treated as clipped
    pub clip_threshold: f32,
    /// Fraction of clipped samples above which the recording is
    /// unusable
    pub max_clipped_fraction: f32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::sms_tapping()
    }
}

impl AnalysisParams {
    /// Defaults for beat-aligned tapping trials
    pub fn sms_tapping() -> Self {
        Self {
            onset: OnsetParams::default(),
            scoring: ScoringParams::default(),
            clip_threshold: 0.99,
            max_clipped_fraction: 0.05,
        }
    }

    /// Defaults for unconstrained (free) tapping trials
    pub fn unconstrained() -> Self {
        Self {
            scoring: ScoringParams {
                mode: AnalysisMode::TappingOnly,
                ..ScoringParams::default()
            },
            ..Self::sms_tapping()
        }
    }

    pub fn from_preset(preset: TappingPreset) -> Self {
        match preset {
            TappingPreset::SmsTapping => Self::sms_tapping(),
            TappingPreset::Unconstrained => Self::unconstrained(),
        }
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.scoring.mode = mode;
        self
    }

    pub fn with_method(mut self, method: DetectionMethod) -> Self {
        self.onset.method = method;
        self
    }

    pub fn with_tolerance_secs(mut self, tolerance: f64) -> Self {
        self.scoring.tolerance_secs = tolerance;
        self
    }

    pub fn with_min_match_rate(mut self, rate: f64) -> Self {
        self.scoring.min_match_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_taps(mut self, min_taps: usize) -> Self {
        self.scoring.min_taps = min_taps;
        self
    }

    pub fn with_refractory_secs(mut self, refractory: f64) -> Self {
        self.onset.refractory_secs = refractory;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_lookup() {
        assert_eq!(
            TappingPreset::from_name("sms_tapping"),
            Some(TappingPreset::SmsTapping)
        );
        assert_eq!(
            TappingPreset::from_name("FREE"),
            Some(TappingPreset::Unconstrained)
        );
        assert_eq!(TappingPreset::from_name("nope"), None);
    }

    #[test]
    fn test_unconstrained_preset_mode() {
        let params = AnalysisParams::from_preset(TappingPreset::Unconstrained);
        assert_eq!(params.scoring.mode, AnalysisMode::TappingOnly);
        // Everything else stays at the sms defaults
        assert_eq!(params.scoring.tolerance_secs, 0.15);
    }

    #[test]
    fn test_builder_clamps_match_rate() {
        let params = AnalysisParams::sms_tapping().with_min_match_rate(1.7);
        assert_eq!(params.scoring.min_match_rate, 1.0);
    }

    #[test]
    fn test_marker_group_span() {
        let marker = MarkerParams::default();
        let span = marker.group_span_secs();
        assert!((span - (2.0 * 0.28 + 0.015)).abs() < 1e-9);
        let none = MarkerParams {
            count: 0,
            ..MarkerParams::default()
        };
        assert_eq!(none.group_span_secs(), 0.0);
    }
}
