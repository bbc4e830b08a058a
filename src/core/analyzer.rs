// src/core/analyzer.rs
//
// Stage 2 orchestrator. Wires decoding, screening, onset detection and
// scoring for one trial recording. Analysis never raises: every internal
// error degrades to a failed verdict so a bad recording cannot abort the
// surrounding experiment session.

use std::path::Path;

use log::{debug, warn};

use super::decoder::{decode_audio, RecordingSample};
use super::dsp::clipped_fraction;
use super::onset::OnsetDetector;
use super::scoring::{score, AlignmentVerdict, FailureReason};
use super::stimulus::StimulusDescriptor;
use super::visualization::{render_tap_plot, TapPlotConfig};
use crate::config::AnalysisParams;
use crate::error::AnalysisError;

/// Trial recording analyzer
pub struct TapAnalyzer {
    params: AnalysisParams,
    detector: OnsetDetector,
}

impl Default for TapAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TapAnalyzer {
    /// Analyzer with sms-tapping defaults
    pub fn new() -> Self {
        Self::with_params(AnalysisParams::default())
    }

    pub fn with_params(params: AnalysisParams) -> Self {
        let detector = OnsetDetector::with_params(params.onset.clone());
        Self { params, detector }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Analyze one recorded trial from a file
    pub fn analyze_file(&self, path: &Path, descriptor: &StimulusDescriptor) -> AlignmentVerdict {
        self.analyze_file_inner(path, descriptor, None)
    }

    /// Analyze one recorded trial and render its tapping plot
    ///
    /// A plot that cannot be rendered is logged and skipped; it never
    /// affects the verdict.
    pub fn analyze_file_with_plot(
        &self,
        path: &Path,
        descriptor: &StimulusDescriptor,
        plot_path: &Path,
    ) -> AlignmentVerdict {
        self.analyze_file_inner(path, descriptor, Some(plot_path))
    }

    fn analyze_file_inner(
        &self,
        path: &Path,
        descriptor: &StimulusDescriptor,
        plot_path: Option<&Path>,
    ) -> AlignmentVerdict {
        let recording = match decode_audio(path) {
            Ok(recording) => recording,
            Err(e) => {
                warn!(
                    "recording {} could not be decoded: {e:#}; failing the trial",
                    path.display()
                );
                return AlignmentVerdict::failure(descriptor, FailureReason::DecodeFailed);
            }
        };

        let verdict = self.analyze(&recording, descriptor);

        if let Some(plot_path) = plot_path {
            let mono = recording.mono();
            if let Err(e) = render_tap_plot(
                &mono,
                recording.sample_rate,
                &verdict,
                &TapPlotConfig::default(),
                plot_path,
            ) {
                warn!("could not render tap plot {}: {e:#}", plot_path.display());
            }
        }

        verdict
    }

    /// Analyze an already-decoded recording
    pub fn analyze(
        &self,
        recording: &RecordingSample,
        descriptor: &StimulusDescriptor,
    ) -> AlignmentVerdict {
        match self.try_analyze(recording, descriptor) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    "analysis of '{}' failed internally: {e}; failing the trial",
                    descriptor.stim_name()
                );
                AlignmentVerdict::failure(descriptor, reason_for(&e))
            }
        }
    }

    fn try_analyze(
        &self,
        recording: &RecordingSample,
        descriptor: &StimulusDescriptor,
    ) -> Result<AlignmentVerdict, AnalysisError> {
        if recording.samples.is_empty() {
            return Err(AnalysisError::EmptyRecording);
        }
        if recording.sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "recording reports a zero sample rate".to_string(),
            ));
        }

        let mono = recording.mono();

        let clipped = clipped_fraction(&mono, self.params.clip_threshold);
        if clipped > self.params.max_clipped_fraction {
            debug!(
                "'{}': {:.1}% of samples clipped, recording unusable",
                descriptor.stim_name(),
                clipped * 100.0
            );
            return Ok(AlignmentVerdict::failure(descriptor, FailureReason::Clipping));
        }

        let onsets = self.detector.detect(&mono, recording.sample_rate);
        Ok(score(&onsets, descriptor, &self.params.scoring))
    }
}

fn reason_for(error: &AnalysisError) -> FailureReason {
    match error {
        AnalysisError::Decode(_) => FailureReason::DecodeFailed,
        AnalysisError::EmptyRecording | AnalysisError::InvalidInput(_) => {
            FailureReason::AnalysisException
        }
    }
}
