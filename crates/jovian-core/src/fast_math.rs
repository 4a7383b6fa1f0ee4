//! Fast mathematical approximations for per-sample modulation.
//!
//! The render loop converts pitch and cutoff from the log to the linear
//! domain once per sample per voice. These replacements for `libm` keep
//! that cost to a handful of multiplies.
//!
//! | Function | Replaces | Used for | Max error |
//! |----------|----------|----------|-----------|
//! | [`fast_exp2`] | `libm::exp2f` | cutoff and pitch modulation | < 0.2% |
//! | [`fast_sin_turns`] | `libm::sinf` | sine oscillator | < 0.001 |
//! | [`fast_tan`] | `libm::tanf` | SVF coefficients | < 0.1% up to 0.45·sr |
//!
//! Per-buffer constants (detune ratios, pan gains) still use `libm`.

use core::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use libm::floorf;

/// Fast base-2 exponential.
///
/// `2^x = 2^⌊x⌋ · 2^frac(x)`: the integer part is written straight into
/// the exponent bits, the fraction uses a 3rd-order polynomial that meets
/// 2.0 exactly at the top of each octave.
///
/// ```
/// use jovian_core::fast_math::fast_exp2;
///
/// assert!((fast_exp2(1.0) - 2.0).abs() < 0.01);
/// assert!((fast_exp2(-3.0) - 0.125).abs() < 0.001);
/// ```
#[inline]
pub fn fast_exp2(x: f32) -> f32 {
    let x = x.clamp(-126.0, 126.0);
    let i = floorf(x) as i32;
    let f = x - i as f32;
    let p = 1.0 + f * (0.693_147_2 + f * (0.227_411_3 + f * 0.079_441_5));
    f32::from_bits(((i + 127) as u32) << 23) * p
}

/// Fast sine with the argument in turns (one cycle per unit).
///
/// Parabolic half-wave with a Bhaskara correction term. Inputs outside
/// \[0, 1) are wrapped.
#[inline]
pub fn fast_sin_turns(turns: f32) -> f32 {
    let p = turns - floorf(turns);
    let (half_p, sign) = if p < 0.5 {
        (p * 2.0, 1.0_f32)
    } else {
        ((p - 0.5) * 2.0, -1.0_f32)
    };
    let y = 4.0 * half_p * (1.0 - half_p);
    sign * (0.225 * y * (y - 1.0) + y)
}

/// Fast tangent on \[0, π/2).
///
/// Padé \[3/2\] approximant `x·(15 − x²)/(15 − 6x²)` on \[0, π/4\]; above
/// that the complement identity `tan(x) = 1 / tan(π/2 − x)` folds the
/// argument back into the same range. Relative error stays under 0.1% for
/// the whole prewarp range `π·fc/sr` with `fc` up to 0.45·sr.
#[inline]
pub fn fast_tan(x: f32) -> f32 {
    if x <= FRAC_PI_4 {
        pade_tan(x)
    } else {
        1.0 / pade_tan(FRAC_PI_2 - x)
    }
}

#[inline]
fn pade_tan(x: f32) -> f32 {
    let x2 = x * x;
    x * (15.0 - x2) / (15.0 - 6.0 * x2)
}
