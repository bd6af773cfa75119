//! The normalized exponential ease-out curve used to shape an animation's
//! progress over time.

/// Lower clamp on the curve's rate constant, avoiding a division by a
/// near-zero denominator when `tail_ratio` is huge.
const MIN_K: f64 = 0.001;

/// `ease(t, r)`: maps linear progress `t` in `[0, 1]` onto eased progress in
/// `[0, 1]`, with `r` (`tail_ratio`) shaping the length of the deceleration
/// tail. Larger `r` produces a longer tail.
///
/// `k = 24 / (r + 1)`, clamped to `k >= MIN_K`; `ease(t) = (1 - e^(-kt)) /
/// (1 - e^-k)`.
pub fn ease(t: f64, tail_ratio: f64) -> f64 {
    let k = (24.0 / (tail_ratio + 1.0)).max(MIN_K);
    (1.0 - (-k * t).exp()) / (1.0 - (-k).exp())
}

/// Applies the easing curve, or falls back to the identity (linear) curve
/// when `easing` is false.
pub fn apply(t: f64, tail_ratio: f64, easing: bool) -> f64 {
    if easing {
        ease(t.clamp(0.0, 1.0), tail_ratio)
    } else {
        t.clamp(0.0, 1.0)
    }
}
