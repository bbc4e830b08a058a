//! Error types for the tapping analysis pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing a stimulus (stage 1).
///
/// Preparation failures are configuration errors: they are fatal to the
/// stimulus in question and surface to the caller at setup time.
#[derive(Debug, Error)]
pub enum PreparationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("source audio is too short ({actual_secs:.2}s, minimum {min_secs:.2}s)")]
    TooShort { actual_secs: f64, min_secs: f64 },

    #[error("beat grid has {actual} onset(s), minimum {min}")]
    TooFewBeats { actual: usize, min: usize },

    #[error("beat onsets must be strictly increasing and non-negative (offending index {index})")]
    UnorderedOnsets { index: usize },

    #[error("bad beat annotation {path}: {message}")]
    BadAnnotation { path: PathBuf, message: String },

    #[error("bad stimulus descriptor {path}: {message}")]
    BadDescriptor { path: PathBuf, message: String },

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Internal errors raised while analyzing a recording (stage 2).
///
/// These never escape the orchestrator: [`crate::core::TapAnalyzer`]
/// converts each of them into a failed verdict with a machine-readable
/// reason, so a single bad recording cannot abort the surrounding
/// experiment session.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to decode recording: {0}")]
    Decode(String),

    #[error("recording contains no samples")]
    EmptyRecording,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
