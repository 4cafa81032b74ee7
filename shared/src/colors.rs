use serde::{Deserialize, Serialize};

/// ColorBrewer YlOrRd, light to dark.
pub const YL_OR_RD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

/// Fill for regions whose selected indicator is missing.
pub const NO_DATA_COLOR: &str = "#d9d9d9";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// Sample the YlOrRd scale at `t` in `[0, 1]`. Out-of-range and NaN inputs are clamped.
pub fn sample_yl_or_rd(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let last = YL_OR_RD.len() - 1;
    let scaled = t * last as f64;
    let lower = (scaled.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let frac = scaled - lower as f64;

    let (r0, g0, b0) = YL_OR_RD[lower];
    let (r1, g1, b1) = YL_OR_RD[upper];
    (
        lerp_channel(r0, r1, frac),
        lerp_channel(g0, g1, frac),
        lerp_channel(b0, b1, frac),
    )
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let from = from as f64;
    let to = to as f64;
    (from + (to - from) * t).round().clamp(0.0, 255.0) as u8
}

/// Position of `value` within `[min, max]`. A zero-width range maps to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span.abs() < f64::EPSILON {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

pub fn rgb_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Evenly spaced gradient stops for a color bar legend.
pub fn yl_or_rd_stops() -> Vec<ColorStop> {
    let last = (YL_OR_RD.len() - 1) as f64;
    YL_OR_RD
        .iter()
        .enumerate()
        .map(|(idx, rgb)| ColorStop {
            offset: idx as f64 / last,
            color: rgb_hex(*rgb),
        })
        .collect()
}
