//! Output formatting for CLI results

use crate::core::scoring::AlignmentVerdict;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

/// Format an analysis verdict for terminal output
pub fn format_verdict(verdict: &AlignmentVerdict, verbose: bool) -> String {
    let mut output = String::new();

    let (color, symbol, label) = if verdict.failed {
        (RED, "✗", "FAILED")
    } else {
        (GREEN, "✓", "PASSED")
    };

    output.push_str(&format!(
        "{color}{symbol} {BOLD}{}{RESET} {color}{label}{RESET}\n",
        verdict.stim_name
    ));

    if let Some(reason) = verdict.reason {
        output.push_str(&format!("  {YELLOW}{:?}{RESET}: {}\n", reason, reason.message()));
    }

    let s = &verdict.summary;
    output.push_str(&format!(
        "  Taps: {} detected, {}/{} matched ({:.0}%), {} missed, {} extra\n",
        s.detected_count,
        s.matched_count,
        s.expected_count,
        s.match_rate * 100.0,
        s.miss_count,
        s.extra_count
    ));

    if let Some(mean_abs) = s.mean_abs_asynchrony_ms {
        output.push_str(&format!(
            "  Asynchrony: {:.1} ms mean abs, {:.1} ms mean, {:.1} ms sd\n",
            mean_abs,
            s.mean_asynchrony_ms.unwrap_or(0.0),
            s.sd_asynchrony_ms.unwrap_or(0.0)
        ));
    }

    if verbose {
        output.push_str(&format!("\n  {DIM}Per-beat matches:{RESET}\n"));
        for m in &verdict.matches {
            match (m.detected_secs, m.offset_secs) {
                (Some(d), Some(o)) => output.push_str(&format!(
                    "    {:7.3}s -> {:7.3}s  ({:+6.1} ms)\n",
                    m.expected_secs,
                    d,
                    o * 1000.0
                )),
                _ => output.push_str(&format!(
                    "    {:7.3}s -> {DIM}miss{RESET}\n",
                    m.expected_secs
                )),
            }
        }
        if !verdict.extras_secs.is_empty() {
            let extras: Vec<String> = verdict
                .extras_secs
                .iter()
                .map(|t| format!("{t:.3}s"))
                .collect();
            output.push_str(&format!("    extras: {}\n", extras.join(", ")));
        }
    }

    output
}
