//! Resonant state variable filter for the synth voice.
//!
//! # Topology
//!
//! Topology-Preserving Transform (TPT) SVF after Zavalishin, "The Art of VA
//! Filter Design" (2012). The trapezoidal integrators keep the analog
//! prototype's response and stay stable under fast cutoff modulation, which
//! the voice does every sample from its envelopes and the LFO.
//!
//! # Modes
//!
//! | [`FilterMode`] | Slope | Output |
//! |----------------|-------|--------|
//! | `Lowpass12` | 12 dB/oct | lowpass of stage 1 |
//! | `Lowpass24` | 24 dB/oct | lowpass of stage 1 into stage 2 |
//! | `Highpass12` | 12 dB/oct | highpass of stage 1 |
//! | `Bandpass12` | 6 dB/oct each side | bandpass of stage 1 |
//!
//! # Resonance
//!
//! Resonance is given as 0..1 and mapped exponentially onto the damping
//! `k = K_MAX · (K_MIN / K_MAX)^r`, so most of the travel is spent in the
//! musically useful range and the top end approaches self-oscillation
//! without reaching it (`K_MIN` is the stability floor). The output is
//! scaled by `1 + 0.5 · r` to offset the passband loss at high resonance.
//!
//! # Coefficient Caching
//!
//! `set_cutoff` is called every sample while the filter is modulated, so it
//! only touches the prewarp (`g`, `a1`) and does so through [`fast_tan`],
//! once cutoff has moved by more than [`CUTOFF_EPSILON_HZ`]. The damping
//! and gain compensation depend on resonance alone and are recomputed in
//! `set_resonance`, which the voice calls once per buffer.

use core::f32::consts::PI;
use libm::powf;

use crate::Effect;
use crate::fast_math::fast_tan;
use crate::flush_denormal;

/// Damping at zero resonance (Q = 0.5).
pub const K_MAX: f32 = 2.0;
/// Damping at full resonance (Q = 20).
pub const K_MIN: f32 = 0.05;
/// Cutoff change below which coefficients are reused.
pub const CUTOFF_EPSILON_HZ: f32 = 1.0;
/// Resonance change below which coefficients are reused.
pub const RESONANCE_EPSILON: f32 = 0.001;
/// Upper cutoff limit as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.45;
/// Lower cutoff limit in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Filter response selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Two-pole lowpass.
    #[default]
    Lowpass12,
    /// Four-pole lowpass (two cascaded stages).
    Lowpass24,
    /// Two-pole highpass.
    Highpass12,
    /// Two-pole bandpass.
    Bandpass12,
}

impl FilterMode {
    /// Map a selector index (0..=3) to a mode. Out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::Lowpass12,
            1 => Self::Lowpass24,
            2 => Self::Highpass12,
            _ => Self::Bandpass12,
        }
    }
}

/// One TPT integrator pair.
#[derive(Debug, Clone, Copy, Default)]
struct SvfStage {
    ic1eq: f32,
    ic2eq: f32,
}

impl SvfStage {
    /// Returns `(lowpass, bandpass, highpass)`.
    #[inline]
    fn tick(&mut self, input: f32, g: f32, k: f32, a1: f32) -> (f32, f32, f32) {
        let v3 = input - self.ic2eq;
        let v1 = a1 * (g * v3 + self.ic1eq);
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);
        (v2, v1, input - k * v1 - v2)
    }
}

/// Resonant multi-mode state variable filter.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to 20.0..=`sample_rate × 0.45` (default 1000.0)
/// - `resonance`: 0.0..=1.0 (default 0.0)
/// - `mode`: [`FilterMode`] (default `Lowpass12`)
///
/// # Example
///
/// ```rust
/// use jovian_core::{Effect, FilterMode, StateVariableFilter};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_mode(FilterMode::Lowpass24);
/// svf.set_cutoff(800.0);
/// svf.set_resonance(0.6);
///
/// let y = svf.process(0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    stage1: SvfStage,
    stage2: SvfStage,

    // Coefficients
    g: f32,
    k: f32,
    /// 1 / (1 + g(g + k))
    a1: f32,
    gain_comp: f32,

    // Values the coefficients were computed for
    coeff_cutoff: f32,
    coeff_resonance: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    mode: FilterMode,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Create a lowpass SVF at 1 kHz with no resonance.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            stage1: SvfStage::default(),
            stage2: SvfStage::default(),
            g: 0.0,
            k: K_MAX,
            a1: 1.0,
            gain_comp: 1.0,
            coeff_cutoff: 0.0,
            coeff_resonance: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: 0.0,
            mode: FilterMode::Lowpass12,
        };
        svf.update_damping();
        svf.update_prewarp();
        svf
    }

    /// Set cutoff frequency in Hz.
    ///
    /// Clamped to 20 Hz..=0.45 × sample rate. Non-finite input is ignored.
    #[inline]
    pub fn set_cutoff(&mut self, freq: f32) {
        if !freq.is_finite() {
            return;
        }
        self.cutoff = freq.clamp(MIN_CUTOFF_HZ, self.sample_rate * MAX_CUTOFF_RATIO);
        if (self.cutoff - self.coeff_cutoff).abs() > CUTOFF_EPSILON_HZ {
            self.update_prewarp();
        }
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance, 0.0 (none) to 1.0 (edge of self-oscillation).
    pub fn set_resonance(&mut self, resonance: f32) {
        if !resonance.is_finite() {
            return;
        }
        self.resonance = resonance.clamp(0.0, 1.0);
        if (self.resonance - self.coeff_resonance).abs() > RESONANCE_EPSILON {
            self.update_damping();
            self.a1 = 1.0 / (1.0 + self.g * (self.g + self.k));
        }
    }

    /// Current resonance (0.0 - 1.0).
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set the filter response.
    pub fn set_mode(&mut self, mode: FilterMode) {
        if mode != self.mode && mode == FilterMode::Lowpass24 {
            // Second stage joins with empty state
            self.stage2 = SvfStage::default();
        }
        self.mode = mode;
    }

    /// Current response.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Damping coefficient currently in use.
    pub fn damping(&self) -> f32 {
        self.k
    }

    #[inline]
    fn update_prewarp(&mut self) {
        self.g = fast_tan(PI * self.cutoff / self.sample_rate);
        self.a1 = 1.0 / (1.0 + self.g * (self.g + self.k));
        self.coeff_cutoff = self.cutoff;
    }

    fn update_damping(&mut self) {
        self.k = K_MAX * powf(K_MIN / K_MAX, self.resonance);
        self.gain_comp = 1.0 + 0.5 * self.resonance;
        self.coeff_resonance = self.resonance;
    }
}

impl Effect for StateVariableFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let (lp, bp, hp) = self.stage1.tick(input, self.g, self.k, self.a1);
        let out = match self.mode {
            FilterMode::Lowpass12 => lp,
            FilterMode::Lowpass24 => self.stage2.tick(lp, self.g, self.k, self.a1).0,
            FilterMode::Highpass12 => hp,
            FilterMode::Bandpass12 => bp,
        };
        out * self.gain_comp
    }

    fn reset(&mut self) {
        self.stage1 = SvfStage::default();
        self.stage2 = SvfStage::default();
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff = self
            .cutoff
            .clamp(MIN_CUTOFF_HZ, sample_rate * MAX_CUTOFF_RATIO);
        self.update_prewarp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle_dc(svf: &mut StateVariableFilter, n: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..n {
            out = svf.process(1.0);
        }
        out
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        let out = settle_dc(&mut svf, 4000);
        assert!((out - 1.0).abs() < 0.01, "LP12 DC gain {out}");
    }

    #[test]
    fn test_lowpass24_passes_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_mode(FilterMode::Lowpass24);
        svf.set_cutoff(1000.0);
        let out = settle_dc(&mut svf, 8000);
        assert!((out - 1.0).abs() < 0.01, "LP24 DC gain {out}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_mode(FilterMode::Highpass12);
        svf.set_cutoff(200.0);
        let out = settle_dc(&mut svf, 20_000);
        assert!(out.abs() < 0.01, "HP DC leak {out}");
    }

    #[test]
    fn test_bandpass_blocks_dc() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_mode(FilterMode::Bandpass12);
        svf.set_cutoff(500.0);
        let out = settle_dc(&mut svf, 20_000);
        assert!(out.abs() < 0.01, "BP DC leak {out}");
    }

    #[test]
    fn test_lowpass24_steeper_than_lowpass12() {
        let sr = 48000.0;
        let tone = 8000.0;
        let mut peak = [0.0_f32; 2];
        for (i, mode) in [FilterMode::Lowpass12, FilterMode::Lowpass24].iter().enumerate() {
            let mut svf = StateVariableFilter::new(sr);
            svf.set_mode(*mode);
            svf.set_cutoff(500.0);
            for n in 0..9600 {
                let x = libm::sinf(2.0 * PI * tone * n as f32 / sr);
                let y = svf.process(x);
                if n > 4800 {
                    peak[i] = peak[i].max(y.abs());
                }
            }
        }
        assert!(peak[1] < peak[0] * 0.2, "LP12 {} LP24 {}", peak[0], peak[1]);
    }

    #[test]
    fn test_resonance_maps_exponentially() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_resonance(0.0);
        assert!((svf.damping() - K_MAX).abs() < 1e-6);
        svf.set_resonance(1.0);
        assert!((svf.damping() - K_MIN).abs() < 1e-4);
        svf.set_resonance(0.5);
        let mid = K_MAX * libm::sqrtf(K_MIN / K_MAX);
        assert!((svf.damping() - mid).abs() < 1e-4);
    }

    #[test]
    fn test_cutoff_clamped() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(1.0);
        assert_eq!(svf.cutoff(), MIN_CUTOFF_HZ);
        svf.set_cutoff(100_000.0);
        assert_eq!(svf.cutoff(), 48000.0 * MAX_CUTOFF_RATIO);
        svf.set_cutoff(f32::NAN);
        assert_eq!(svf.cutoff(), 48000.0 * MAX_CUTOFF_RATIO);
    }

    #[test]
    fn test_small_cutoff_moves_reuse_coefficients() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        let g = svf.g;
        svf.set_cutoff(1000.5);
        assert_eq!(svf.g, g);
        svf.set_cutoff(1010.0);
        assert!(svf.g > g);
    }

    #[test]
    fn test_cutoff_moves_leave_damping_alone() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_resonance(0.7);
        let k = svf.damping();
        let gain = svf.gain_comp;
        for i in 0..2000 {
            svf.set_cutoff(100.0 + i as f32 * 10.0);
            assert_eq!(svf.damping(), k);
            assert_eq!(svf.gain_comp, gain);
        }
    }

    #[test]
    fn test_prewarp_accurate_up_to_max_cutoff() {
        let sr = 48000.0;
        let mut svf = StateVariableFilter::new(sr);
        for &fc in &[1000.0, 4600.0, 8000.0, 12_000.0, 18_000.0, sr * MAX_CUTOFF_RATIO] {
            svf.set_cutoff(fc);
            let exact = libm::tanf(PI * svf.cutoff() / sr);
            assert!((svf.g - exact).abs() / exact < 0.002, "fc={fc} g={} tan={exact}", svf.g);
        }
    }

    #[test]
    fn test_resonance_change_updates_a1() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(2000.0);
        let a1 = svf.a1;
        svf.set_resonance(1.0);
        let expected = 1.0 / (1.0 + svf.g * (svf.g + svf.damping()));
        assert!(svf.a1 > a1);
        assert!((svf.a1 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_impulse_response_decays() {
        let sr = 48000.0;
        for &cutoff in &[20.0, 200.0, 2000.0, 15_000.0, sr * 0.45] {
            for &res in &[0.0, 0.5, 0.9, 1.0] {
                for mode in [
                    FilterMode::Lowpass12,
                    FilterMode::Lowpass24,
                    FilterMode::Highpass12,
                    FilterMode::Bandpass12,
                ] {
                    let mut svf = StateVariableFilter::new(sr);
                    svf.set_mode(mode);
                    svf.set_cutoff(cutoff);
                    svf.set_resonance(res);
                    let mut tail = 0.0_f32;
                    for n in 0..10_000 {
                        let y = svf.process(if n == 0 { 1.0 } else { 0.0 });
                        assert!(y.is_finite());
                        assert!(y.abs() < 1000.0, "{mode:?} fc={cutoff} r={res} y={y}");
                        if n >= 9_000 {
                            tail = tail.max(y.abs());
                        }
                    }
                    assert!(tail < 0.5, "{mode:?} fc={cutoff} r={res} tail={tail}");
                }
            }
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_mode(FilterMode::Lowpass24);
        settle_dc(&mut svf, 1000);
        svf.reset();
        assert_eq!(svf.process(0.0), 0.0);
    }
}
