//! Configuration module for TapCheckr

mod params;

pub use params::{
    AnalysisMode, AnalysisParams, DetectionMethod, MarkerParams, OnsetParams, ScoringParams,
    StimulusParams, TappingPreset,
};
