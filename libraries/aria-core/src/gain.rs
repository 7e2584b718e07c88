//! Decibel/linear conversions and clamp helpers
//!
//! All conversions are amplitude (not power) based: `linear = 10^(dB/20)`.

/// Convert a gain in dB to a linear amplitude multiplier
///
/// Total for every finite input; `0 dB` maps to exactly `1.0`.
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude multiplier to dB
///
/// Non-positive input maps to negative infinity.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Saturating clamp of `sample` into `[min, max]`
///
/// Used after gain multiplication so integer conversion can never wrap.
/// NaN input (for float types) is returned unchanged; callers converting to
/// integers with `as` get zero for it.
#[inline]
pub fn clamp_to_range<T: PartialOrd + Copy>(sample: T, min: T, max: T) -> T {
    if sample < min {
        min
    } else if sample > max {
        max
    } else {
        sample
    }
}
