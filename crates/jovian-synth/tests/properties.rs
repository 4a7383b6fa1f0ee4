//! Property-based tests for jovian-synth.
//!
//! Whatever the parameters, hub values, notes and block sizes, rendered
//! output stays finite and inside ±1, and the poly voice count holds.

use jovian_synth::{MAX_FRAMES, NUM_DESTINATIONS, NUM_PARAMS, NUM_VOICES, Param, SynthEngine};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Random sound, random chord, random block sizes: output stays bounded.
    #[test]
    fn render_bounded(
        params in prop::collection::vec(-20i32..130, NUM_PARAMS),
        hub in prop::collection::vec(0i32..=100, NUM_DESTINATIONS),
        notes in prop::collection::vec((0u8..=127, 1u8..=127), 1..10),
        frames in prop::collection::vec(1usize..=300, 1..12),
        sample_rate in prop::sample::select(vec![22_050.0f32, 44_100.0, 48_000.0, 96_000.0]),
    ) {
        let mut synth = SynthEngine::new();
        synth.init(sample_rate);
        for (dest, &raw) in hub.iter().enumerate() {
            synth.set_parameter(Param::ModHub.index() as u8, dest as i32);
            synth.set_parameter(Param::ModAmount.index() as u8, raw);
        }
        for (id, &value) in params.iter().enumerate() {
            synth.set_parameter(id as u8, value);
        }
        for &(note, velocity) in &notes {
            synth.note_on(note, velocity);
        }

        let mut out = vec![0.0_f32; 300 * 2];
        for &n in &frames {
            out.fill(f32::NAN);
            synth.render(&mut out, n);
            for &s in &out[..n.min(MAX_FRAMES) * 2] {
                prop_assert!(s.is_finite());
                prop_assert!(s.abs() <= 1.0, "{}", s);
            }
            prop_assert!(synth.active_voices() <= NUM_VOICES);
        }
    }

    /// Every parameter value reads back clamped into its declared range.
    #[test]
    fn parameters_clamp(id in 0u8..24, value in any::<i32>()) {
        let mut synth = SynthEngine::new();
        synth.init(48_000.0);
        synth.set_parameter(id, value);
        let desc = Param::from_index(id as usize).map(|p| p.descriptor());
        prop_assert!(desc.is_some());
        if let Some(desc) = desc {
            let stored = synth.parameter(id);
            prop_assert!(stored >= desc.min && stored <= desc.max);
        }
    }
}
