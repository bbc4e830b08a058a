//! Alignment scoring (stage 2, second half)
//!
//! Matches detected taps against the expected beat grid and derives the
//! trial verdict.

mod alignment;
mod verdict;

pub use alignment::{align, Alignment, OnsetMatch};
pub use verdict::{score, AlignmentVerdict, FailureReason, TapSummary};
