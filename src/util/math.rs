//! Numeric helpers shared by the kernels and the rectifier.

/// BT.601 luma with fixed-point weights `(299, 587, 114) / 1000`, rounded.
pub(crate) fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    let sum = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((sum + 500) / 1000) as u8
}

/// Rounds and saturates an interpolated channel value.
pub(crate) fn round_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Z component of `(a - o) x (b - o)`.
pub(crate) fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Sine of the angle at `o` between the rays towards `a` and `b`.
///
/// Returns `0.0` when either ray has zero length.
pub(crate) fn corner_sine(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let la = (a[0] - o[0]).hypot(a[1] - o[1]);
    let lb = (b[0] - o[0]).hypot(b[1] - o[1]);
    let denom = la * lb;
    if denom <= f64::EPSILON {
        return 0.0;
    }
    cross(o, a, b) / denom
}
