//! Preset data and the factory bank.
//!
//! A [`Preset`] is the complete sound: all 24 parameter values plus the raw
//! value of every modulation-hub destination. Factory presets start from
//! the table defaults and override only what defines the sound.

use crate::mod_hub::{ModDestination, NUM_DESTINATIONS, default_raw_values};
use crate::params::{NUM_PARAMS, Param, default_values};

/// Full engine sound state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Parameter values in [`Param`] order.
    pub params: [i32; NUM_PARAMS],
    /// Raw 0..=100 hub values in [`ModDestination`] order.
    pub hub: [u8; NUM_DESTINATIONS],
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            params: default_values(),
            hub: default_raw_values(),
        }
    }
}

impl Preset {
    /// Value of `param`.
    pub fn get(&self, param: Param) -> i32 {
        self.params[param.index()]
    }

    /// Set `param`, clamped to its range.
    pub fn set(&mut self, param: Param, value: i32) {
        self.params[param.index()] = param.descriptor().clamp(value);
    }

    /// Raw value of `dest`.
    pub fn hub_raw(&self, dest: ModDestination) -> u8 {
        self.hub[dest.index()]
    }

    /// Set the raw value of `dest`, clamped to 0..=100.
    pub fn set_hub_raw(&mut self, dest: ModDestination, raw: u8) {
        self.hub[dest.index()] = raw.min(100);
    }

    fn with(mut self, overrides: &[(Param, i32)]) -> Self {
        for &(param, value) in overrides {
            self.set(param, value);
        }
        self
    }

    fn with_hub(mut self, overrides: &[(ModDestination, u8)]) -> Self {
        for &(dest, raw) in overrides {
            self.set_hub_raw(dest, raw);
        }
        self
    }
}

/// A named preset from the built-in bank.
#[derive(Debug, Clone, Copy)]
pub struct FactoryPreset {
    /// Display name.
    pub name: &'static str,
    /// Sound data.
    pub preset: Preset,
}

/// Number of factory presets.
pub const NUM_FACTORY_PRESETS: usize = 6;

/// Raw hub value selecting LP24 on the VCF type destination.
const LP24: u8 = 33;

/// Build the factory bank.
pub fn factory_presets() -> [FactoryPreset; NUM_FACTORY_PRESETS] {
    use ModDestination as D;
    use Param as P;

    [
        FactoryPreset {
            name: "Init 1",
            preset: Preset::default()
                .with(&[(P::ModHub, D::VcfType.index() as i32)])
                .with_hub(&[(D::VcfType, LP24)]),
        },
        FactoryPreset {
            name: "Bass 1",
            preset: Preset::default()
                .with(&[
                    (P::Dco1Octave, 0),
                    (P::Dco1Wave, 2),
                    (P::Dco1PulseWidth, 31),
                    (P::Dco2Octave, 0),
                    (P::Cutoff, 39),
                    (P::Resonance, 39),
                    (P::KeyFollow, 75),
                    (P::FilterAttack, 0),
                    (P::FilterDecay, 27),
                    (P::FilterSustain, 16),
                    (P::FilterRelease, 8),
                    (P::AmpAttack, 0),
                    (P::AmpDecay, 31),
                    (P::AmpSustain, 63),
                    (P::AmpRelease, 12),
                    (P::ModHub, D::VcfType.index() as i32),
                ])
                .with_hub(&[(D::VcfType, LP24)]),
        },
        FactoryPreset {
            name: "Lead 1",
            preset: Preset::default()
                .with(&[
                    (P::Dco2Octave, 2),
                    (P::Sync, 2),
                    (P::OscMix, 30),
                    (P::Cutoff, 71),
                    (P::Resonance, 55),
                    (P::KeyFollow, 40),
                    (P::FilterDecay, 24),
                    (P::FilterSustain, 47),
                    (P::FilterRelease, 20),
                    (P::AmpAttack, 2),
                    (P::AmpDecay, 24),
                    (P::LfoRate, 50),
                    (P::ModHub, D::LfoToVcf.index() as i32),
                ])
                .with_hub(&[(D::LfoToVcf, 30)]),
        },
        FactoryPreset {
            name: "Pad 1",
            preset: Preset::default()
                .with(&[
                    (P::Dco2Tune, 53),
                    (P::OscMix, 50),
                    (P::Cutoff, 63),
                    (P::Resonance, 20),
                    (P::KeyFollow, 20),
                    (P::FilterAttack, 35),
                    (P::FilterDecay, 39),
                    (P::FilterSustain, 55),
                    (P::FilterRelease, 39),
                    (P::AmpAttack, 39),
                    (P::AmpRelease, 55),
                    (P::LfoRate, 35),
                    (P::ModHub, D::VcfType.index() as i32),
                ])
                .with_hub(&[(D::VcfType, LP24)]),
        },
        FactoryPreset {
            name: "Brass 1",
            preset: Preset::default()
                .with(&[
                    (P::CrossMod, 15),
                    (P::OscMix, 40),
                    (P::Cutoff, 59),
                    (P::Resonance, 24),
                    (P::KeyFollow, 60),
                    (P::FilterAttack, 12),
                    (P::FilterDecay, 35),
                    (P::FilterSustain, 51),
                    (P::FilterRelease, 27),
                    (P::AmpAttack, 12),
                    (P::AmpDecay, 35),
                    (P::AmpSustain, 71),
                    (P::AmpRelease, 24),
                    (P::LfoRate, 40),
                    (P::ModHub, D::EnvToVcf.index() as i32),
                ])
                .with_hub(&[(D::EnvToVcf, 70)]),
        },
        FactoryPreset {
            name: "String 1",
            preset: Preset::default()
                .with(&[
                    (P::Dco2Tune, 55),
                    (P::OscMix, 50),
                    (P::Cutoff, 75),
                    (P::KeyFollow, 25),
                    (P::FilterAttack, 47),
                    (P::FilterDecay, 43),
                    (P::FilterSustain, 59),
                    (P::FilterRelease, 47),
                    (P::AmpAttack, 51),
                    (P::AmpDecay, 43),
                    (P::AmpRelease, 63),
                    (P::LfoRate, 38),
                    (P::ModHub, D::LfoToVco.index() as i32),
                ])
                .with_hub(&[(D::LfoToVco, 20)]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_names() {
        let bank = factory_presets();
        let names: [&str; NUM_FACTORY_PRESETS] = core::array::from_fn(|i| bank[i].name);
        assert_eq!(names, ["Init 1", "Bass 1", "Lead 1", "Pad 1", "Brass 1", "String 1"]);
    }

    #[test]
    fn test_init_selects_lp24() {
        let init = factory_presets()[0].preset;
        assert_eq!(init.get(Param::ModHub), ModDestination::VcfType.index() as i32);
        assert_eq!(ModDestination::VcfType.descriptor().to_native(init.hub_raw(ModDestination::VcfType)), 1);
        assert_eq!(init.get(Param::Cutoff), 79);
    }

    #[test]
    fn test_every_value_in_range() {
        for fp in factory_presets() {
            for p in Param::ALL {
                let v = fp.preset.get(p);
                assert_eq!(p.descriptor().clamp(v), v, "{} {:?}", fp.name, p);
            }
            assert!(fp.preset.hub.iter().all(|&r| r <= 100));
        }
    }

    #[test]
    fn test_set_clamps() {
        let mut p = Preset::default();
        p.set(Param::Sync, 9);
        assert_eq!(p.get(Param::Sync), 2);
        p.set_hub_raw(ModDestination::Hpf, 250);
        assert_eq!(p.hub_raw(ModDestination::Hpf), 100);
    }
}
