// src/core/scoring/verdict.rs
//
// Verdict computation: alignment plus trial-acceptance policy. A verdict
// is data, not an error; the host decides what to do with a failed one.

use serde::{Deserialize, Serialize};

use super::alignment::{align, OnsetMatch};
use crate::config::{AnalysisMode, ScoringParams};
use crate::core::onset::OnsetSet;
use crate::core::stimulus::StimulusDescriptor;

/// Enumerated causes for a failed trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The recording could not be decoded
    DecodeFailed,
    /// No taps were found in the recording
    NoTapsDetected,
    /// Fewer taps than the scorable minimum
    TooFewTaps,
    /// Too few taps landed inside the tolerance window
    LowMatchRate,
    /// The recording is clipped beyond use
    Clipping,
    /// Unexpected internal failure during analysis
    AnalysisException,
}

impl FailureReason {
    /// Remediation message the host can show the participant
    pub fn message(&self) -> &'static str {
        match self {
            Self::DecodeFailed => "We could not read your recording. Please check your microphone and try again.",
            Self::NoTapsDetected => "We could not hear any taps. Please tap louder, directly on the surface near your microphone.",
            Self::TooFewTaps => "We heard too few taps to score this trial. Please keep tapping until the music ends.",
            Self::LowMatchRate => "Your taps did not line up with the beat. Please try to tap in time with the music.",
            Self::Clipping => "Your recording was distorted. Please lower your microphone gain or tap more softly.",
            Self::AnalysisException => "Something went wrong while scoring this trial. Please try again.",
        }
    }
}

/// Summary statistics over one scored trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapSummary {
    pub expected_count: usize,
    pub detected_count: usize,
    pub matched_count: usize,
    pub miss_count: usize,
    pub extra_count: usize,
    /// Matched fraction of the expected grid, 0..=1
    pub match_rate: f64,
    /// Mean signed asynchrony over matched pairs, milliseconds
    pub mean_asynchrony_ms: Option<f64>,
    /// Mean absolute asynchrony over matched pairs, milliseconds
    pub mean_abs_asynchrony_ms: Option<f64>,
    /// Asynchrony standard deviation over matched pairs, milliseconds
    pub sd_asynchrony_ms: Option<f64>,
}

/// Terminal artifact of one trial analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentVerdict {
    pub stim_name: String,
    pub failed: bool,
    pub reason: Option<FailureReason>,
    /// One entry per expected beat, in grid order - always, even for
    /// failure verdicts synthesized without detection
    pub matches: Vec<OnsetMatch>,
    /// Detected taps that matched no beat, ascending
    pub extras_secs: Vec<f64>,
    pub summary: TapSummary,
}

impl AlignmentVerdict {
    /// Verdict for a trial whose recording never produced usable onsets
    /// (decode failure, clipping, internal error). Every expected beat
    /// is recorded as a miss.
    pub fn failure(descriptor: &StimulusDescriptor, reason: FailureReason) -> Self {
        let matches: Vec<OnsetMatch> = descriptor
            .onsets_secs()
            .iter()
            .map(|&e| OnsetMatch::miss(e))
            .collect();
        let expected_count = matches.len();

        Self {
            stim_name: descriptor.stim_name().to_string(),
            failed: true,
            reason: Some(reason),
            matches,
            extras_secs: Vec::new(),
            summary: TapSummary {
                expected_count,
                detected_count: 0,
                matched_count: 0,
                miss_count: expected_count,
                extra_count: 0,
                match_rate: 0.0,
                mean_asynchrony_ms: None,
                mean_abs_asynchrony_ms: None,
                sd_asynchrony_ms: None,
            },
        }
    }
}

/// Score a detected onset set against a stimulus descriptor
pub fn score(
    onsets: &OnsetSet,
    descriptor: &StimulusDescriptor,
    params: &ScoringParams,
) -> AlignmentVerdict {
    if onsets.is_empty() {
        return AlignmentVerdict::failure(descriptor, FailureReason::NoTapsDetected);
    }

    let alignment = align(onsets.times(), descriptor.onsets_secs(), params.tolerance_secs);
    let summary = summarize(&alignment.matches, onsets.len(), alignment.extras_secs.len());

    let reason = if onsets.len() < params.min_taps {
        Some(FailureReason::TooFewTaps)
    } else if params.mode == AnalysisMode::BeatAlignment
        && summary.match_rate < params.min_match_rate
    {
        Some(FailureReason::LowMatchRate)
    } else {
        None
    };

    AlignmentVerdict {
        stim_name: descriptor.stim_name().to_string(),
        failed: reason.is_some(),
        reason,
        matches: alignment.matches,
        extras_secs: alignment.extras_secs,
        summary,
    }
}

fn summarize(matches: &[OnsetMatch], detected_count: usize, extra_count: usize) -> TapSummary {
    let expected_count = matches.len();
    let offsets: Vec<f64> = matches.iter().filter_map(|m| m.offset_secs).collect();
    let matched_count = offsets.len();

    let match_rate = if expected_count > 0 {
        matched_count as f64 / expected_count as f64
    } else {
        0.0
    };

    let (mean, mean_abs, sd) = if matched_count > 0 {
        let mean = offsets.iter().sum::<f64>() / matched_count as f64;
        let mean_abs = offsets.iter().map(|o| o.abs()).sum::<f64>() / matched_count as f64;
        let variance = offsets
            .iter()
            .map(|o| (o - mean) * (o - mean))
            .sum::<f64>()
            / matched_count as f64;
        (
            Some(mean * 1000.0),
            Some(mean_abs * 1000.0),
            Some(variance.sqrt() * 1000.0),
        )
    } else {
        (None, None, None)
    };

    TapSummary {
        expected_count,
        detected_count,
        matched_count,
        miss_count: expected_count - matched_count,
        extra_count,
        match_rate,
        mean_asynchrony_ms: mean,
        mean_abs_asynchrony_ms: mean_abs,
        sd_asynchrony_ms: sd,
    }
}
