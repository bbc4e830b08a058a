//! Stimulus preparation (stage 1)
//!
//! Decodes a source music file, embeds synchronization markers, derives
//! the expected beat grid, and emits a [`StimulusDescriptor`] alongside
//! the playable waveform. Results are cached by stimulus identity.

mod cache;
mod descriptor;
pub mod markers;
mod preparer;

pub use cache::StimulusCache;
pub use descriptor::StimulusDescriptor;
pub use preparer::{PreparedStimulus, StimulusPreparer};
