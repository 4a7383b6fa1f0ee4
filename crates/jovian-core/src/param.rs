//! Parameter smoothing for zipper-free changes.
//!
//! Host parameter writes land as steps. Feeding a step straight into a
//! filter cutoff or a mixer gain produces audible "zipper" clicks, so the
//! engine routes those values through [`SmoothedParam`], an exponential
//! (one-pole) approach used for cutoff, oscillator mix, widener settings
//! and MIDI pressure.
//!
//! ```rust
//! use jovian_core::SmoothedParam;
//!
//! let mut cutoff = SmoothedParam::with_config(0.5, 48000.0, 10.0);
//! cutoff.set_target(0.9);
//!
//! for _ in 0..4800 {
//!     cutoff.advance();
//! }
//! assert!((cutoff.get() - 0.9).abs() < 0.001);
//! ```

use libm::expf;

/// Exponentially smoothed parameter.
///
/// `y[n] = y[n-1] + coeff * (target - y[n-1])`, with the coefficient derived
/// from a time constant in milliseconds. A smoothing time of zero makes
/// changes instant.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create an unsmoothed parameter holding `initial`.
    ///
    /// Call [`set_sample_rate`](Self::set_sample_rate) and
    /// [`set_smoothing_time_ms`](Self::set_smoothing_time_ms) to enable smoothing.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with sample rate and time constant.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` without smoothing (preset loads, reset).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set the time constant in milliseconds (0 = instant).
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Value being approached.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value is within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Skip the remaining transition.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    // coeff = 1 - exp(-1 / (tau * sr)); 63% of a step after one time constant
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_param_is_instant() {
        let mut p = SmoothedParam::new(0.2);
        p.set_target(0.7);
        assert_eq!(p.advance(), 0.7);
        assert!(p.is_settled());
    }

    #[test]
    fn test_smoothed_param_one_time_constant() {
        // 1 ms at 48 kHz = 48 samples per time constant
        let mut p = SmoothedParam::with_config(0.0, 48000.0, 1.0);
        p.set_target(1.0);
        for _ in 0..48 {
            p.advance();
        }
        assert!((p.get() - 0.632).abs() < 0.01, "got {}", p.get());
    }

    #[test]
    fn test_smoothed_param_monotonic_approach() {
        let mut p = SmoothedParam::with_config(1.0, 48000.0, 5.0);
        p.set_target(0.0);
        let mut prev = p.get();
        for _ in 0..1000 {
            let v = p.advance();
            assert!(v <= prev);
            assert!(v >= 0.0);
            prev = v;
        }
    }

    #[test]
    fn test_set_immediate_skips_ramp() {
        let mut p = SmoothedParam::with_config(0.0, 48000.0, 50.0);
        p.set_immediate(0.8);
        assert_eq!(p.get(), 0.8);
        assert_eq!(p.advance(), 0.8);
    }
}
