//! One-pole (6 dB/oct) highpass.
//!
//! [`OnePoleHighpass`] is a leaky differentiator,
//! `y[n] = a·(y[n-1] + x[n] - x[n-1])` with `a = exp(-2π·f/sr)`. It is the
//! per-voice bass cut ahead of the main filter.
//!
//! Reference: Julius O. Smith III, "Introduction to Digital Filters with
//! Audio Applications", One-Pole Filter.

use crate::Effect;
use crate::flush_denormal;
use libm::expf;

#[inline]
fn pole_coeff(freq_hz: f32, sample_rate: f32) -> f32 {
    let nyquist = sample_rate * 0.5;
    expf(-core::f32::consts::TAU * freq_hz.clamp(0.0, nyquist) / sample_rate)
}

/// One-pole highpass filter.
///
/// Passes everything above the cutoff and blocks DC. Cutoff changes only
/// swap the coefficient, so it can be retuned once per buffer.
#[derive(Debug, Clone)]
pub struct OnePoleHighpass {
    prev_in: f32,
    prev_out: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePoleHighpass {
    /// Create a highpass at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            prev_in: 0.0,
            prev_out: 0.0,
            coeff: pole_coeff(freq_hz, sample_rate),
            sample_rate,
            freq: freq_hz,
        }
    }

    /// Set the -3 dB frequency.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        if freq_hz != self.freq {
            self.freq = freq_hz;
            self.coeff = pole_coeff(freq_hz, self.sample_rate);
        }
    }

    /// Set the raw pole coefficient, as precomputed by [`Self::coefficient_for`].
    #[inline]
    pub fn set_coefficient(&mut self, coeff: f32) {
        self.coeff = coeff.clamp(0.0, 1.0);
    }

    /// Pole coefficient for `freq_hz` at `sample_rate`.
    pub fn coefficient_for(freq_hz: f32, sample_rate: f32) -> f32 {
        pole_coeff(freq_hz, sample_rate)
    }
}

impl Effect for OnePoleHighpass {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let out = flush_denormal(self.coeff * (self.prev_out + input - self.prev_in));
        self.prev_in = input;
        self.prev_out = out;
        out
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.coeff = pole_coeff(self.freq, sample_rate);
    }

    fn reset(&mut self) {
        self.prev_in = 0.0;
        self.prev_out = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highpass_blocks_dc() {
        let mut hp = OnePoleHighpass::new(48000.0, 100.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process(1.0);
        }
        assert!(out.abs() < 1e-4, "DC leak {out}");
    }

    #[test]
    fn test_highpass_passes_nyquist() {
        let mut hp = OnePoleHighpass::new(48000.0, 20.0);
        let mut last = 0.0;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            last = hp.process(input);
        }
        assert!(last.abs() > 0.95, "Nyquist out {last}");
    }

    #[test]
    fn test_reset_clears_state() {
        let mut hp = OnePoleHighpass::new(48000.0, 500.0);
        hp.process(1.0);
        hp.reset();
        assert_eq!(hp.process(0.0), 0.0);
    }
}
