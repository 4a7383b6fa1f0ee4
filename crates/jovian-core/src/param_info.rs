//! Parameter metadata for discoverable, host-facing controls.
//!
//! Synth parameters are small integers in fixed ranges (a 0..=100 knob, a
//! 0..=3 waveform selector). Each one is described by a static
//! [`ParamDescriptor`] carrying its range, default, unit, optional choice
//! labels, and a stable [`ParamId`] / `string_id` pair for preset files.
//!
//! [`ParameterInfo`] gives hosts, the CLI, and preset code uniform indexed
//! access to any parameter set without knowing its concrete type.
//!
//! # Example
//!
//! ```rust
//! use jovian_core::{ParamDescriptor, ParamId, ParamUnit, ParameterInfo};
//!
//! static LEVEL: ParamDescriptor = ParamDescriptor::new("LEVEL", 0, 100, 80)
//!     .with_id(ParamId(0), "level")
//!     .with_unit(ParamUnit::Percent);
//!
//! struct Gain {
//!     level: i32,
//! }
//!
//! impl ParameterInfo for Gain {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<&'static ParamDescriptor> {
//!         (index == 0).then_some(&LEVEL)
//!     }
//!
//!     fn get_param(&self, index: usize) -> i32 {
//!         if index == 0 { self.level } else { 0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: i32) {
//!         if index == 0 {
//!             self.level = LEVEL.clamp(value);
//!         }
//!     }
//! }
//!
//! let mut g = Gain { level: 80 };
//! g.set_param(0, 250);
//! assert_eq!(g.get_param(0), 100);
//! assert_eq!(g.find_param_by_name("level"), Some(0));
//! ```

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` never changes for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Unit of a parameter's native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Plain number.
    #[default]
    None,
    /// Percentage of full scale.
    Percent,
    /// Hundredths of a semitone.
    Cents,
    /// Semitones.
    Semitones,
    /// Seconds.
    Seconds,
    /// Hertz.
    Hertz,
    /// Index into the descriptor's choice labels.
    Choice,
}

impl ParamUnit {
    /// Display suffix (`"%"`, `"ct"`, ...). Empty for plain numbers and choices.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::None | Self::Choice => "",
            Self::Percent => "%",
            Self::Cents => "ct",
            Self::Semitones => "st",
            Self::Seconds => "s",
            Self::Hertz => "Hz",
        }
    }
}

/// Static description of one integer parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Short display name, at most 10 characters.
    pub name: &'static str,
    /// Stable machine name used in preset files.
    pub string_id: &'static str,
    /// Stable numeric id.
    pub id: ParamId,
    /// Minimum value (inclusive).
    pub min: i32,
    /// Maximum value (inclusive).
    pub max: i32,
    /// Value after construction and in fresh presets.
    pub default: i32,
    /// Unit of the value.
    pub unit: ParamUnit,
    /// Centered at the middle of the range (displayed with a sign).
    pub bipolar: bool,
    /// Labels for `ParamUnit::Choice` parameters, one per value from `min`.
    pub choices: &'static [&'static str],
    /// Page or section name for grouped display.
    pub group: &'static str,
}

impl ParamDescriptor {
    /// A plain parameter over `min..=max`.
    pub const fn new(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self {
            name,
            string_id: "",
            id: ParamId(0),
            min,
            max,
            default,
            unit: ParamUnit::None,
            bipolar: false,
            choices: &[],
            group: "",
        }
    }

    /// A 0..=100 percentage parameter.
    pub const fn percent(name: &'static str, default: i32) -> Self {
        Self::new(name, 0, 100, default).with_unit(ParamUnit::Percent)
    }

    /// A selector over `choices`, valued `0..choices.len()`.
    pub const fn choice(name: &'static str, choices: &'static [&'static str], default: i32) -> Self {
        let mut d = Self::new(name, 0, choices.len() as i32 - 1, default);
        d.unit = ParamUnit::Choice;
        d.choices = choices;
        d
    }

    /// Sets the stable ids.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Marks the parameter as bipolar.
    pub const fn bipolar(mut self) -> Self {
        self.bipolar = true;
        self
    }

    /// Sets the display group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// Clamp a value into `min..=max`.
    #[inline]
    pub const fn clamp(&self, value: i32) -> i32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Map a value to 0.0..=1.0 across the range.
    #[inline]
    pub fn normalize(&self, value: i32) -> f32 {
        let range = self.max - self.min;
        if range == 0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) as f32 / range as f32
    }

    /// Map 0.0..=1.0 back to the nearest value in range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> i32 {
        let range = (self.max - self.min) as f32;
        let v = self.min as f32 + normalized.clamp(0.0, 1.0) * range;
        self.clamp(libm::roundf(v) as i32)
    }

    /// Label for `value` when this is a choice parameter.
    pub fn choice_label(&self, value: i32) -> Option<&'static str> {
        if self.choices.is_empty() || value < self.min || value > self.max {
            return None;
        }
        self.choices.get((value - self.min) as usize).copied()
    }

    /// True for selectors with labelled steps.
    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// Indexed access to a set of integer parameters.
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Descriptor for `index`, or `None` when out of range.
    fn param_info(&self, index: usize) -> Option<&'static ParamDescriptor>;

    /// Current value. Out-of-range indices return 0.
    fn get_param(&self, index: usize) -> i32;

    /// Set a value. Implementations clamp; out-of-range indices are ignored.
    fn set_param(&mut self, index: usize, value: i32);

    /// Find a parameter by `string_id` or display name (case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|d| {
                d.string_id.eq_ignore_ascii_case(name) || d.name.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Find a parameter index by stable id.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}
