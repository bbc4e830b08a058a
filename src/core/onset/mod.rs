//! Tap onset extraction
//!
//! Turns a recorded waveform into an ordered set of tap times. Two
//! methods are available:
//!
//! - Energy-envelope peak picking (default): gated upward crossings of a
//!   peak-following envelope
//! - Spectral flux: rectified frame-to-frame magnitude change with an
//!   adaptive median threshold

mod detector;
mod spectral_flux;

pub use detector::OnsetDetector;

use serde::{Deserialize, Serialize};

/// Ordered sequence of detected tap times, in seconds
///
/// May be empty (a silent recording is not an error). Times are
/// ascending; detections closer than the refractory interval have
/// already been collapsed to the earliest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OnsetSet {
    onsets_secs: Vec<f64>,
}

impl OnsetSet {
    /// Build from tap times; sorts to restore the ascending invariant
    pub fn from_times(mut times: Vec<f64>) -> Self {
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self { onsets_secs: times }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Detected tap times in seconds, ascending
    pub fn times(&self) -> &[f64] {
        &self.onsets_secs
    }

    pub fn len(&self) -> usize {
        self.onsets_secs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.onsets_secs.is_empty()
    }
}
