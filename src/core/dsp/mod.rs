//! DSP utilities shared by the detection and preparation stages

pub mod filters;
pub mod resample;
pub mod stats;
pub mod windows;

pub use resample::resample_mono;
pub use stats::{amplitude_to_db, clipped_fraction, envelope, median, moving_average, peak_amplitude, rms};
