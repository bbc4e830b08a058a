// src/core/scoring/alignment.rs
//
// Greedy nearest-first assignment of detected taps to expected beats.
// Not globally optimal (dense pathological onset sets can mis-assign);
// kept greedy on purpose so verdicts stay explainable and stable.

use serde::{Deserialize, Serialize};

/// One expected beat and whatever tap matched it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnsetMatch {
    /// Expected beat time, seconds
    pub expected_secs: f64,
    /// Matched tap time, if any
    pub detected_secs: Option<f64>,
    /// Signed asynchrony (tap minus beat), seconds
    pub offset_secs: Option<f64>,
}

impl OnsetMatch {
    pub fn miss(expected_secs: f64) -> Self {
        Self {
            expected_secs,
            detected_secs: None,
            offset_secs: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.detected_secs.is_some()
    }
}

/// Result of aligning a detected onset set against an expected grid
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// One entry per expected beat, in grid order
    pub matches: Vec<OnsetMatch>,
    /// Detected taps that matched no beat, ascending
    pub extras_secs: Vec<f64>,
}

/// Align detected taps to expected beats within a symmetric tolerance
///
/// Candidate pairs are taken in order of ascending absolute offset, ties
/// broken by earliest detected tap; each tap matches at most one beat
/// and vice versa (injective both ways).
pub fn align(detected: &[f64], expected: &[f64], tolerance_secs: f64) -> Alignment {
    struct Candidate {
        abs_offset: f64,
        detected_idx: usize,
        expected_idx: usize,
    }

    let mut candidates = Vec::new();
    for (ei, &e) in expected.iter().enumerate() {
        for (di, &d) in detected.iter().enumerate() {
            let offset = d - e;
            if offset.abs() <= tolerance_secs {
                candidates.push(Candidate {
                    abs_offset: offset.abs(),
                    detected_idx: di,
                    expected_idx: ei,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        a.abs_offset
            .partial_cmp(&b.abs_offset)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(detected[a.detected_idx].partial_cmp(&detected[b.detected_idx]).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.expected_idx.cmp(&b.expected_idx))
    });

    let mut matched_detected = vec![false; detected.len()];
    let mut assigned: Vec<Option<usize>> = vec![None; expected.len()];

    for candidate in &candidates {
        if assigned[candidate.expected_idx].is_some() || matched_detected[candidate.detected_idx] {
            continue;
        }
        assigned[candidate.expected_idx] = Some(candidate.detected_idx);
        matched_detected[candidate.detected_idx] = true;
    }

    let matches = expected
        .iter()
        .zip(assigned.iter())
        .map(|(&e, slot)| match slot {
            Some(di) => OnsetMatch {
                expected_secs: e,
                detected_secs: Some(detected[*di]),
                offset_secs: Some(detected[*di] - e),
            },
            None => OnsetMatch::miss(e),
        })
        .collect();

    let extras_secs = detected
        .iter()
        .zip(matched_detected.iter())
        .filter(|(_, &used)| !used)
        .map(|(&d, _)| d)
        .collect();

    Alignment {
        matches,
        extras_secs,
    }
}
