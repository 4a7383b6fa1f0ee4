//! Property-based tests for jovian-core DSP primitives.
//!
//! Filter boundedness for arbitrary settings and input, LFO output range
//! under every waveform/rate/delay combination, and smoothing convergence.

use jovian_core::{
    Effect, FilterMode, Lfo, LfoWaveform, ParamDescriptor, SmoothedParam, StateVariableFilter,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For any cutoff in 20 Hz..0.9·Nyquist, resonance in 0..1, and mode,
    /// the SVF stays finite and bounded on full-scale random input.
    #[test]
    fn svf_bounded(
        cutoff in 20.0f32..21_600.0f32,
        resonance in 0.0f32..=1.0f32,
        mode in 0i32..4,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(cutoff);
        svf.set_resonance(resonance);
        svf.set_mode(FilterMode::from_index(mode));

        for _ in 0..64 {
            for &x in &input {
                let y = svf.process(x);
                prop_assert!(y.is_finite());
                prop_assert!(y.abs() < 200.0, "cutoff={} res={} mode={} out={}", cutoff, resonance, mode, y);
            }
        }
    }

    /// LFO output never leaves -1..=1.
    #[test]
    fn lfo_in_range(
        rate in 0.0f32..40.0f32,
        waveform in 0i32..4,
        delay in 0.0f32..6.0f32,
        steps in 1usize..20_000,
    ) {
        let mut lfo = Lfo::new(48000.0, rate);
        lfo.set_waveform(LfoWaveform::from_index(waveform));
        lfo.set_delay(delay);
        lfo.trigger();
        for _ in 0..steps {
            let v = lfo.advance();
            prop_assert!((-1.0..=1.0).contains(&v), "{}", v);
        }
        prop_assert!(lfo.frequency() >= 0.1 - 1e-4 && lfo.frequency() <= 20.0 + 1e-3);
    }

    /// SmoothedParam always moves monotonically toward its target.
    #[test]
    fn smoothed_param_monotonic(
        start in -100.0f32..100.0f32,
        target in -100.0f32..100.0f32,
        time_ms in 0.5f32..100.0f32,
    ) {
        let mut p = SmoothedParam::with_config(start, 48000.0, time_ms);
        p.set_target(target);
        let mut prev = start;
        for _ in 0..1000 {
            let v = p.advance();
            if target >= start {
                prop_assert!(v >= prev - 1e-4 && v <= target + 1e-4);
            } else {
                prop_assert!(v <= prev + 1e-4 && v >= target - 1e-4);
            }
            prev = v;
        }
    }

    /// Normalize and denormalize agree on every in-range value.
    #[test]
    fn descriptor_normalize_inverse(min in -50i32..0, span in 1i32..200, pick in 0.0f32..=1.0f32) {
        let d = ParamDescriptor::new("P", min, min + span, min);
        let v = d.denormalize(pick);
        prop_assert_eq!(d.denormalize(d.normalize(v)), v);
    }
}
