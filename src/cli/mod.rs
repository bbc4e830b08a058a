//! Terminal output for the tapcheckr binary

pub mod output;

pub use output::format_verdict;
