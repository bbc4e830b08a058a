//! Core pipeline: stimulus preparation, onset detection, alignment
//! scoring, and the per-trial orchestrator

pub mod analyzer;
pub mod decoder;
pub mod dsp;
pub mod onset;
pub mod scoring;
pub mod stimulus;
pub mod visualization;

pub use analyzer::TapAnalyzer;
pub use decoder::{decode_audio, RecordingSample};
pub use onset::{OnsetDetector, OnsetSet};
pub use scoring::{score, AlignmentVerdict, FailureReason, OnsetMatch, TapSummary};
pub use stimulus::{PreparedStimulus, StimulusCache, StimulusDescriptor, StimulusPreparer};
