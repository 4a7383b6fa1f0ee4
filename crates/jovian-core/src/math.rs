//! Mathematical utility functions for DSP.
//!
//! Small, allocation-free helpers used throughout the signal chain.
//!
//! # Waveshaping / Clipping
//!
//! | Function | Character | Use Case |
//! |----------|-----------|----------|
//! | [`soft_clip`] | Smooth, asymptotic | Output stage saturation |
//!
//! # Numeric Hygiene
//!
//! - [`flush_denormal`] - Zero out subnormal-range state in feedback paths
//! - [`sanitize`] - Replace NaN/Inf with silence
//! - [`DENORMAL_BIAS`] - Inaudible offset added to the final output
//!
//! # Utilities
//!
//! - [`ms_to_samples`] - Time conversion
//! - [`equal_power_pan`] - Pan position to left/right gains

use core::f32::consts::FRAC_PI_4;
use libm::{cosf, sinf, tanhf};

/// Tiny DC offset added to the rendered output.
///
/// Keeps downstream feedback paths out of the subnormal range when the
/// engine is silent. Far below the 24-bit noise floor.
pub const DENORMAL_BIAS: f32 = 1.0e-15;

/// Soft clip using hyperbolic tangent.
///
/// Smooth saturation that approaches ±1 asymptotically.
///
/// # Returns
/// Soft-clipped output in range (-1, 1)
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Equal-power pan law.
///
/// Maps a pan position in \[-1, 1\] (left to right) to `(left, right)`
/// gains with `left² + right² = 1`. Center yields `(√½, √½)`.
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    let theta = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (cosf(theta), sinf(theta))
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range begins. Use in filter integrators and any
/// state that decays toward zero indefinitely.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Replace non-finite values (NaN, ±Inf) with silence.
#[inline]
pub fn sanitize(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}
