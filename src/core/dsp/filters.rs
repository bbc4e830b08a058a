//! Signal conditioning filters

/// One-pole DC blocker (high-pass)
///
/// y[n] = x[n] - x[n-1] + r * y[n-1], with r close to 1. Removes the DC
/// offset and low-frequency rumble that cheap microphones add to tapping
/// recordings without touching the tap transients.
pub fn dc_block(samples: &[f32], r: f32) -> Vec<f32> {
    if samples.is_empty() {
        return vec![];
    }

    let mut output = Vec::with_capacity(samples.len());
    let mut prev_x = samples[0];
    let mut prev_y = 0.0f32;

    output.push(0.0);
    for &x in &samples[1..] {
        let y = x - prev_x + r * prev_y;
        output.push(y);
        prev_x = x;
        prev_y = y;
    }

    output
}
