//! TapCheckr - Score tapping recordings against a musical beat
//!
//! Analysis pipeline for tap-to-beat experiments: participants tap along
//! to music, their tapping audio is recorded, and each recording is
//! scored against the music's beat grid.
//!
//! ## Pipeline
//!
//! 1. **Stimulus preparation** - decode a music file, embed
//!    synchronization markers, derive the expected beat grid, emit a
//!    [`StimulusDescriptor`] plus the playable waveform. Deterministic
//!    and cached by stimulus identity ([`StimulusCache`]).
//! 2. **Recording analysis** - decode a trial recording, screen for
//!    clipping, extract tap onsets, align them to the beat grid, and
//!    produce an [`AlignmentVerdict`] (pass/fail with an enumerated
//!    reason and summary statistics).
//!
//! A verdict is data: analysis never raises for a bad recording, so one
//! unusable trial cannot abort an experiment session. Preparation
//! failures, by contrast, are configuration errors and surface as
//! [`PreparationError`] at setup time.
//!
//! ## Module Structure
//!
//! - `core` - decoding, DSP, onset detection, scoring, orchestration
//! - `config` - parameter structs and presets
//! - `cli` - terminal output formatting for the `tapcheckr` binary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapcheckr::{StimulusPreparer, TapAnalyzer, StimulusDescriptor};
//!
//! // Stage 1: once per stimulus, at setup time
//! let prepared = StimulusPreparer::new().prepare("music_1", "music/music_1.wav".as_ref())?;
//! prepared.descriptor.save_json("stimuli/music_1.json".as_ref())?;
//!
//! // Stage 2: once per submitted recording
//! let descriptor = StimulusDescriptor::load_json("stimuli/music_1.json".as_ref())?;
//! let verdict = TapAnalyzer::new().analyze_file("recording.wav".as_ref(), &descriptor);
//!
//! if verdict.failed {
//!     println!("{}", verdict.reason.unwrap().message());
//! }
//! ```

// Core analysis functionality
pub mod core;

// Command-line output formatting
pub mod cli;

// Configuration and presets
pub mod config;

// Error types
pub mod error;

// Re-export commonly used types at crate root for convenience
pub use config::{
    AnalysisMode, AnalysisParams, DetectionMethod, MarkerParams, OnsetParams, ScoringParams,
    StimulusParams, TappingPreset,
};
pub use crate::core::{
    decode_audio, score, AlignmentVerdict, FailureReason, OnsetDetector, OnsetMatch, OnsetSet,
    PreparedStimulus, RecordingSample, StimulusCache, StimulusDescriptor, StimulusPreparer,
    TapAnalyzer, TapSummary,
};
pub use error::{AnalysisError, PreparationError};
