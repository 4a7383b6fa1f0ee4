//! Modulation hub: sixteen modulation targets behind two parameters.
//!
//! One parameter selects a destination, the other edits the selected
//! destination's value. Every destination keeps its own raw 0..=100 value
//! (what presets store and what the value knob shows) plus that value
//! mapped into the destination's native range (what the DSP reads):
//!
//! ```text
//! native = min + round(raw · (max − min) / 100)
//! ```
//!
//! Selecting a destination never changes any stored value, so a detour
//! through other destinations always comes back to the same setting.
//!
//! ```rust
//! use jovian_synth::{ModDestination, ModHub};
//!
//! let mut hub = ModHub::new();
//! hub.set_destination(ModDestination::LfoToVcf.index());
//! hub.set_value(70);
//! hub.set_destination(ModDestination::Hpf.index());
//! hub.set_destination(ModDestination::LfoToVcf.index());
//! assert_eq!(hub.raw(ModDestination::LfoToVcf), 70);
//! ```

use core::fmt;

use jovian_core::ParamUnit;

/// Number of hub destinations.
pub const NUM_DESTINATIONS: usize = 16;

/// Hub destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModDestination {
    /// LFO to pulse width.
    #[default]
    LfoToPwm = 0,
    /// LFO to filter cutoff.
    LfoToVcf,
    /// LFO to pitch (vibrato).
    LfoToVco,
    /// Filter envelope to pulse width.
    EnvToPwm,
    /// Extra filter envelope depth, bipolar.
    EnvToVcf,
    /// Per-voice high-pass cutoff.
    Hpf,
    /// Filter response.
    VcfType,
    /// LFO fade-in time.
    LfoDelay,
    /// LFO waveform.
    LfoWave,
    /// Output level.
    VcaLevel,
    /// LFO to amplitude.
    Tremolo,
    /// Amplitude key tracking.
    VcaKeyTrack,
    /// Voice mode (mono, poly, unison).
    Mode,
    /// Unison detune in cents.
    UnisonDetune,
    /// Filter envelope to pitch, bipolar semitones.
    EnvToPitch,
    /// Glide time.
    Portamento,
}

impl ModDestination {
    /// Every destination in index order.
    pub const ALL: [Self; NUM_DESTINATIONS] = [
        Self::LfoToPwm,
        Self::LfoToVcf,
        Self::LfoToVco,
        Self::EnvToPwm,
        Self::EnvToVcf,
        Self::Hpf,
        Self::VcfType,
        Self::LfoDelay,
        Self::LfoWave,
        Self::VcaLevel,
        Self::Tremolo,
        Self::VcaKeyTrack,
        Self::Mode,
        Self::UnisonDetune,
        Self::EnvToPitch,
        Self::Portamento,
    ];

    /// Destination at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in the destination table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static descriptor.
    #[inline]
    pub fn descriptor(self) -> &'static HubDestination {
        &DESTINATIONS[self.index()]
    }
}

/// Static description of one hub destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HubDestination {
    /// Display name, at most 10 characters.
    pub name: &'static str,
    /// Stable machine name used in preset files.
    pub string_id: &'static str,
    /// Unit of the native value.
    pub unit: ParamUnit,
    /// Native minimum.
    pub min: i32,
    /// Native maximum.
    pub max: i32,
    /// Raw 0..=100 value in a fresh preset.
    pub default_raw: u8,
    /// Displayed with a sign.
    pub bipolar: bool,
    /// Labels for selector destinations, one per native value from `min`.
    pub choices: &'static [&'static str],
}

impl HubDestination {
    const fn new(name: &'static str, string_id: &'static str, min: i32, max: i32, default_raw: u8) -> Self {
        Self {
            name,
            string_id,
            unit: ParamUnit::Percent,
            min,
            max,
            default_raw,
            bipolar: false,
            choices: &[],
        }
    }

    const fn unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    const fn bipolar(mut self) -> Self {
        self.bipolar = true;
        self
    }

    const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.unit = ParamUnit::Choice;
        self.choices = choices;
        self
    }

    /// Map a raw 0..=100 value into the native range, rounding to nearest.
    #[inline]
    pub const fn to_native(&self, raw: u8) -> i32 {
        let raw = if raw > 100 { 100 } else { raw as i32 };
        self.min + (raw * (self.max - self.min) + 50) / 100
    }

    /// Text for a raw value: choice label, signed number, or number with unit.
    pub fn format(&self, raw: u8, out: &mut impl fmt::Write) -> fmt::Result {
        let native = self.to_native(raw);
        if let Some(label) = self.choices.get((native - self.min) as usize) {
            return out.write_str(label);
        }
        if self.bipolar {
            write!(out, "{native:+}{}", self.unit.suffix())
        } else {
            write!(out, "{native}{}", self.unit.suffix())
        }
    }
}

/// Filter response labels, in `FilterMode` order.
pub const VCF_TYPE_LABELS: &[&str] = &["LP12", "LP24", "HP12", "BP12"];
/// LFO waveform labels, in `LfoWaveform` order.
pub const LFO_WAVE_LABELS: &[&str] = &["TRI", "RAMP", "SQR", "S&H"];
/// Voice mode labels, in `SynthMode` order.
pub const MODE_LABELS: &[&str] = &["MONO", "POLY", "UNISON"];

/// Destination table, indexed by [`ModDestination`].
pub static DESTINATIONS: [HubDestination; NUM_DESTINATIONS] = [
    HubDestination::new("LFO>PWM", "lfo_to_pwm", 0, 100, 0),
    HubDestination::new("LFO>VCF", "lfo_to_vcf", 0, 100, 0),
    HubDestination::new("LFO>VCO", "lfo_to_vco", 0, 100, 0),
    HubDestination::new("ENV>PWM", "env_to_pwm", 0, 100, 0),
    HubDestination::new("ENV>VCF", "env_to_vcf", -100, 100, 50).bipolar(),
    HubDestination::new("HPF", "hpf", 0, 100, 0),
    HubDestination::new("VCF TYP", "vcf_type", 0, 3, 0).choices(VCF_TYPE_LABELS),
    HubDestination::new("LFO DLY", "lfo_delay", 0, 100, 0),
    HubDestination::new("LFO WAV", "lfo_wave", 0, 3, 0).choices(LFO_WAVE_LABELS),
    HubDestination::new("VCA LVL", "vca_level", 0, 100, 100),
    HubDestination::new("TREMOLO", "tremolo", 0, 100, 0),
    HubDestination::new("VCA KYB", "vca_key_track", 0, 100, 0),
    HubDestination::new("MODE", "mode", 0, 2, 50).choices(MODE_LABELS),
    HubDestination::new("UNI DET", "unison_detune", 0, 50, 40).unit(ParamUnit::Cents),
    HubDestination::new("ENV>PITCH", "env_to_pitch", -12, 12, 50)
        .unit(ParamUnit::Semitones)
        .bipolar(),
    HubDestination::new("PORTA", "portamento", 0, 100, 0),
];

/// Find a destination by `string_id` or display name (case-insensitive).
pub fn find_destination(name: &str) -> Option<ModDestination> {
    ModDestination::ALL.into_iter().find(|d| {
        let desc = d.descriptor();
        desc.string_id.eq_ignore_ascii_case(name) || desc.name.eq_ignore_ascii_case(name)
    })
}

/// Raw values of a fresh preset.
pub fn default_raw_values() -> [u8; NUM_DESTINATIONS] {
    let mut raw = [0; NUM_DESTINATIONS];
    for (slot, desc) in raw.iter_mut().zip(DESTINATIONS.iter()) {
        *slot = desc.default_raw;
    }
    raw
}

/// Live hub state: the selection plus raw and native values per destination.
#[derive(Debug, Clone)]
pub struct ModHub {
    selected: ModDestination,
    raw: [u8; NUM_DESTINATIONS],
    native: [i32; NUM_DESTINATIONS],
}

impl Default for ModHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ModHub {
    /// Hub at default values with the first destination selected.
    pub fn new() -> Self {
        let mut hub = Self {
            selected: ModDestination::LfoToPwm,
            raw: [0; NUM_DESTINATIONS],
            native: [0; NUM_DESTINATIONS],
        };
        hub.load_raw(&default_raw_values());
        hub
    }

    /// Select the destination the value parameter edits. Out-of-range
    /// indices are ignored. Stored values are untouched.
    pub fn set_destination(&mut self, index: usize) {
        if let Some(dest) = ModDestination::from_index(index) {
            self.selected = dest;
        }
    }

    /// Selected destination.
    pub fn destination(&self) -> ModDestination {
        self.selected
    }

    /// Set the selected destination from a raw 0..=100 value (clamped).
    pub fn set_value(&mut self, raw: i32) {
        self.set_value_for(self.selected, raw);
    }

    /// Set any destination from a raw 0..=100 value (clamped).
    pub fn set_value_for(&mut self, dest: ModDestination, raw: i32) {
        let raw = raw.clamp(0, 100) as u8;
        let i = dest.index();
        self.raw[i] = raw;
        self.native[i] = DESTINATIONS[i].to_native(raw);
    }

    /// Native value of `dest`.
    #[inline]
    pub fn value(&self, dest: ModDestination) -> i32 {
        self.native[dest.index()]
    }

    /// Raw 0..=100 value of `dest`.
    #[inline]
    pub fn raw(&self, dest: ModDestination) -> u8 {
        self.raw[dest.index()]
    }

    /// Raw value of the selected destination.
    pub fn current_raw(&self) -> u8 {
        self.raw(self.selected)
    }

    /// Native value as 0.0..=1.0 across the destination's range.
    #[inline]
    pub fn normalized_unipolar(&self, dest: ModDestination) -> f32 {
        let desc = dest.descriptor();
        let range = (desc.max - desc.min) as f32;
        if range <= 0.0 {
            return 0.0;
        }
        (self.value(dest) - desc.min) as f32 / range
    }

    /// Native value as -1.0..=1.0 across the destination's range.
    #[inline]
    pub fn normalized_bipolar(&self, dest: ModDestination) -> f32 {
        self.normalized_unipolar(dest) * 2.0 - 1.0
    }

    /// Descriptor of `dest`.
    pub fn descriptor(&self, dest: ModDestination) -> &'static HubDestination {
        dest.descriptor()
    }

    /// Write the display text of `raw` for `dest`.
    pub fn format_value(
        &self,
        dest: ModDestination,
        raw: u8,
        out: &mut impl fmt::Write,
    ) -> fmt::Result {
        dest.descriptor().format(raw, out)
    }

    /// All raw values, in destination order.
    pub fn raw_values(&self) -> [u8; NUM_DESTINATIONS] {
        self.raw
    }

    /// Replace all raw values (each clamped). The selection is kept.
    pub fn load_raw(&mut self, raw: &[u8; NUM_DESTINATIONS]) {
        for dest in ModDestination::ALL {
            self.set_value_for(dest, i32::from(raw[dest.index()]));
        }
    }
}
