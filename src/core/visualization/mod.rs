//! Visual output for per-trial inspection

pub mod plot;

pub use plot::{render_tap_plot, TapPlotConfig};
