//! Engine parameter table.
//!
//! 24 integer parameters laid out in six pages of four, the way a small
//! hardware panel addresses them. Values are stored raw; the mapping
//! helpers below turn them into DSP quantities once per buffer.
//!
//! | # | Name | Range | Default |
//! |---|------|-------|---------|
//! | 0 | D1 OCT | 16' 8' 4' | 8' |
//! | 1 | D1 WAVE | SAW SQR PULSE TRI SAW PWM | SAW |
//! | 2 | D1 PW | 0-100% | 50 |
//! | 3 | XMOD | 0-100% | 0 |
//! | 4 | D2 OCT | 16' 8' 4' | 8' |
//! | 5 | D2 WAVE | SAW NOISE PULSE SINE | SAW |
//! | 6 | D2 TUNE | 0-100 (50 = 0 ct) | 50 |
//! | 7 | SYNC | OFF SOFT HARD | OFF |
//! | 8 | OSC MIX | 0-100% | 0 |
//! | 9 | CUTOFF | 0-100 | 79 |
//! | 10 | RESO | 0-100% | 16 |
//! | 11 | KEYFLW | 0-100% | 50 |
//! | 12-15 | F.ATK F.DCY F.SUS F.REL | 0-100 | 4 31 50 24 |
//! | 16-19 | A.ATK A.DCY A.SUS A.REL | 0-100 | 1 39 79 16 |
//! | 20 | LFO RATE | 0-100 | 32 |
//! | 21 | MOD HUB | 0-15 | 0 |
//! | 22 | MOD AMT | 0-100 | value of the selected destination |
//! | 23 | EFFECT | CHORUS SPACE DRY BOTH | CHORUS |

use jovian_core::{ParamDescriptor, ParamId, ParamUnit};
use libm::exp2f;

/// Number of engine parameters.
pub const NUM_PARAMS: usize = 24;

/// Octave footage labels.
pub const OCTAVE_LABELS: &[&str] = &["16'", "8'", "4'"];
/// DCO1 waveform labels.
pub const DCO1_WAVE_LABELS: &[&str] = &["SAW", "SQR", "PULSE", "TRI", "SAW PWM"];
/// DCO2 waveform labels.
pub const DCO2_WAVE_LABELS: &[&str] = &["SAW", "NOISE", "PULSE", "SINE"];
/// Sync mode labels.
pub const SYNC_LABELS: &[&str] = &["OFF", "SOFT", "HARD"];
/// Output effect labels.
pub const EFFECT_LABELS: &[&str] = &["CHORUS", "SPACE", "DRY", "BOTH"];

/// Engine parameter index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Param {
    /// DCO1 footage.
    Dco1Octave = 0,
    /// DCO1 waveform.
    Dco1Wave,
    /// Pulse width shared by both DCOs.
    Dco1PulseWidth,
    /// DCO2 to DCO1 frequency modulation.
    CrossMod,
    /// DCO2 footage.
    Dco2Octave,
    /// DCO2 waveform.
    Dco2Wave,
    /// DCO2 fine tune.
    Dco2Tune,
    /// Oscillator sync.
    Sync,
    /// DCO1/DCO2 balance.
    OscMix,
    /// Filter cutoff.
    Cutoff,
    /// Filter resonance.
    Resonance,
    /// Filter key tracking.
    KeyFollow,
    /// Filter envelope attack.
    FilterAttack,
    /// Filter envelope decay.
    FilterDecay,
    /// Filter envelope sustain.
    FilterSustain,
    /// Filter envelope release.
    FilterRelease,
    /// Amplitude envelope attack.
    AmpAttack,
    /// Amplitude envelope decay.
    AmpDecay,
    /// Amplitude envelope sustain.
    AmpSustain,
    /// Amplitude envelope release.
    AmpRelease,
    /// LFO rate.
    LfoRate,
    /// Modulation hub destination selector.
    ModHub,
    /// Value of the selected hub destination.
    ModAmount,
    /// Output effect.
    Effect,
}

impl Param {
    /// Every parameter in index order.
    pub const ALL: [Self; NUM_PARAMS] = [
        Self::Dco1Octave,
        Self::Dco1Wave,
        Self::Dco1PulseWidth,
        Self::CrossMod,
        Self::Dco2Octave,
        Self::Dco2Wave,
        Self::Dco2Tune,
        Self::Sync,
        Self::OscMix,
        Self::Cutoff,
        Self::Resonance,
        Self::KeyFollow,
        Self::FilterAttack,
        Self::FilterDecay,
        Self::FilterSustain,
        Self::FilterRelease,
        Self::AmpAttack,
        Self::AmpDecay,
        Self::AmpSustain,
        Self::AmpRelease,
        Self::LfoRate,
        Self::ModHub,
        Self::ModAmount,
        Self::Effect,
    ];

    /// Parameter at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in the table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static descriptor.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self.index()]
    }
}

const fn pct(index: u32, name: &'static str, id: &'static str, group: &'static str, default: i32) -> ParamDescriptor {
    ParamDescriptor::percent(name, default)
        .with_id(ParamId(index), id)
        .with_group(group)
}

const fn sel(
    index: u32,
    name: &'static str,
    id: &'static str,
    group: &'static str,
    labels: &'static [&'static str],
    default: i32,
) -> ParamDescriptor {
    ParamDescriptor::choice(name, labels, default)
        .with_id(ParamId(index), id)
        .with_group(group)
}

/// Descriptor table, indexed by [`Param`].
pub static PARAMS: [ParamDescriptor; NUM_PARAMS] = [
    sel(0, "D1 OCT", "dco1_octave", "DCO-1", OCTAVE_LABELS, 1),
    sel(1, "D1 WAVE", "dco1_wave", "DCO-1", DCO1_WAVE_LABELS, 0),
    pct(2, "D1 PW", "dco1_pw", "DCO-1", 50),
    pct(3, "XMOD", "xmod", "DCO-1", 0),
    sel(4, "D2 OCT", "dco2_octave", "DCO-2", OCTAVE_LABELS, 1),
    sel(5, "D2 WAVE", "dco2_wave", "DCO-2", DCO2_WAVE_LABELS, 0),
    ParamDescriptor::new("D2 TUNE", 0, 100, 50)
        .with_id(ParamId(6), "dco2_tune")
        .with_group("DCO-2")
        .bipolar(),
    sel(7, "SYNC", "sync", "DCO-2", SYNC_LABELS, 0),
    pct(8, "OSC MIX", "osc_mix", "VCF", 0),
    ParamDescriptor::new("CUTOFF", 0, 100, 79)
        .with_id(ParamId(9), "vcf_cutoff")
        .with_group("VCF"),
    pct(10, "RESO", "vcf_resonance", "VCF", 16),
    pct(11, "KEYFLW", "vcf_keyfollow", "VCF", 50),
    ParamDescriptor::new("F.ATK", 0, 100, 4)
        .with_id(ParamId(12), "filter_attack")
        .with_group("VCF ENV"),
    ParamDescriptor::new("F.DCY", 0, 100, 31)
        .with_id(ParamId(13), "filter_decay")
        .with_group("VCF ENV"),
    pct(14, "F.SUS", "filter_sustain", "VCF ENV", 50),
    ParamDescriptor::new("F.REL", 0, 100, 24)
        .with_id(ParamId(15), "filter_release")
        .with_group("VCF ENV"),
    ParamDescriptor::new("A.ATK", 0, 100, 1)
        .with_id(ParamId(16), "amp_attack")
        .with_group("VCA ENV"),
    ParamDescriptor::new("A.DCY", 0, 100, 39)
        .with_id(ParamId(17), "amp_decay")
        .with_group("VCA ENV"),
    pct(18, "A.SUS", "amp_sustain", "VCA ENV", 79),
    ParamDescriptor::new("A.REL", 0, 100, 16)
        .with_id(ParamId(19), "amp_release")
        .with_group("VCA ENV"),
    ParamDescriptor::new("LFO RATE", 0, 100, 32)
        .with_id(ParamId(20), "lfo_rate")
        .with_group("MOD"),
    ParamDescriptor::new("MOD HUB", 0, 15, 0)
        .with_id(ParamId(21), "mod_hub")
        .with_group("MOD"),
    ParamDescriptor::new("MOD AMT", 0, 100, 0)
        .with_id(ParamId(22), "mod_amount")
        .with_group("MOD"),
    sel(23, "EFFECT", "effect", "MOD", EFFECT_LABELS, 0),
];

/// Default value of every parameter, in index order.
pub fn default_values() -> [i32; NUM_PARAMS] {
    let mut values = [0; NUM_PARAMS];
    for (value, desc) in values.iter_mut().zip(PARAMS.iter()) {
        *value = desc.default;
    }
    values
}

/// Find a parameter by `string_id` or display name (case-insensitive).
pub fn find_param(name: &str) -> Option<Param> {
    Param::ALL.into_iter().find(|p| {
        let d = p.descriptor();
        d.string_id.eq_ignore_ascii_case(name) || d.name.eq_ignore_ascii_case(name)
    })
}

/// Frequency multiplier for a footage selector value.
pub fn octave_multiplier(value: i32) -> f32 {
    match value {
        i32::MIN..=0 => 0.5,
        1 => 1.0,
        _ => 2.0,
    }
}

/// DCO2 fine tune in cents (`50` is in tune, range ±50).
pub fn dco2_tune_cents(value: i32) -> f32 {
    (value.clamp(0, 100) - 50) as f32
}

/// Cutoff frequency for a normalized 0..=1 control.
///
/// Blends a linear and an exponential curve so the low end of the knob
/// still moves audibly: 100 Hz at 0, 12.8 kHz at 1.
pub fn cutoff_hz(normalized: f32) -> f32 {
    let n = normalized.clamp(0.0, 1.0);
    100.0 * (0.15 * (1.0 + 127.0 * n) + 0.85 * exp2f(7.0 * n))
}
