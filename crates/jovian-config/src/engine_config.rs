//! Engine configuration file.

use std::path::Path;

use jovian_synth::{
    AllocationStrategy, EffectMode, MAX_FRAMES, MAX_UNISON, Param, SynthEngine, factory_presets,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::paths;
use crate::user_preset::UserPreset;
use crate::validation::{ValidationError, check_range};

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;
/// Longest accepted steal fade in milliseconds.
pub const MAX_STEAL_RELEASE_MS: f32 = 100.0;

/// Free-voice strategy as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Allocation {
    /// Reuse the free voice that was released longest ago.
    #[default]
    OldestNote,
    /// Cycle through voices.
    RoundRobin,
    /// Lowest-numbered free voice.
    FirstAvailable,
}

impl From<Allocation> for AllocationStrategy {
    fn from(value: Allocation) -> Self {
        match value {
            Allocation::OldestNote => AllocationStrategy::OldestNote,
            Allocation::RoundRobin => AllocationStrategy::RoundRobin,
            Allocation::FirstAvailable => AllocationStrategy::FirstAvailable,
        }
    }
}

/// Widener setting as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// Short modulated delay.
    Chorus,
    /// Longer, deeper delay.
    Space,
    /// Bypassed.
    Dry,
    /// Longest and deepest.
    Both,
}

impl Effect {
    /// Value of the EFFECT parameter.
    pub fn index(self) -> i32 {
        match self {
            Effect::Chorus => 0,
            Effect::Space => 1,
            Effect::Dry => 2,
            Effect::Both => 3,
        }
    }
}

impl From<Effect> for EffectMode {
    fn from(value: Effect) -> Self {
        EffectMode::from_index(value.index())
    }
}

/// `[output]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Widener override; when absent the preset's EFFECT value stands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

/// Host-side engine settings.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// buffer_size = 256
/// unison_voices = 5
/// allocation = "oldest-note"
/// steal_release_ms = 5.0
/// default_preset = "Init 1"
///
/// [output]
/// effect = "chorus"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Requested device sample rate in Hz.
    pub sample_rate: u32,
    /// Requested device buffer in frames.
    pub buffer_size: u32,
    /// Copies stacked in unison mode.
    pub unison_voices: u8,
    /// Free-voice strategy in poly mode.
    pub allocation: Allocation,
    /// Fade time of a stolen voice.
    pub steal_release_ms: f32,
    /// Factory preset name or user preset name/path loaded at start.
    pub default_preset: String,
    /// Output stage.
    pub output: OutputConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            buffer_size: MAX_FRAMES as u32,
            unison_voices: jovian_synth::DEFAULT_UNISON_VOICES as u8,
            allocation: Allocation::OldestNote,
            steal_release_ms: 5.0,
            default_preset: "Init 1".to_string(),
            output: OutputConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load the user config file, or defaults when there is none.
    pub fn load_or_default() -> Result<Self> {
        let path = paths::config_file();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), "saved engine config");
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its range.
    pub fn validate(&self) -> Result<()> {
        check_range("sample_rate", self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)?;
        check_range("buffer_size", self.buffer_size, 1, 8192)?;
        check_range("unison_voices", self.unison_voices, 1, MAX_UNISON as u8)?;
        check_range("steal_release_ms", self.steal_release_ms, 0.0, MAX_STEAL_RELEASE_MS)?;
        if self.default_preset.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Configure `engine`: voice handling, default preset, effect override.
    ///
    /// The engine must already be initialized; `sample_rate` and
    /// `buffer_size` are requests to the audio device, not engine settings.
    pub fn apply(&self, engine: &mut SynthEngine) -> Result<()> {
        self.validate()?;
        engine.set_unison_voices(usize::from(self.unison_voices));
        engine.set_allocation_strategy(self.allocation.into());
        engine.set_steal_release_ms(self.steal_release_ms);
        load_named_preset(engine, &self.default_preset)?;
        if let Some(effect) = self.output.effect {
            engine.set_parameter(Param::Effect.index() as u8, effect.index());
        }
        tracing::debug!(preset = %self.default_preset, "applied engine config");
        Ok(())
    }
}

/// Load a factory preset by name (case-insensitive) or index, or a user
/// preset by name or path.
pub fn load_named_preset(engine: &mut SynthEngine, name: &str) -> Result<()> {
    if let Some(index) = factory_index(name) {
        engine.load_preset(index);
        return Ok(());
    }
    let path = paths::find_user_preset(name)
        .ok_or_else(|| ValidationError::UnknownPreset(name.to_string()))?;
    let preset = UserPreset::load(path)?.to_preset()?;
    engine.apply_preset(&preset);
    Ok(())
}

/// Index of a factory preset given its name or its number.
pub fn factory_index(name: &str) -> Option<usize> {
    let presets = factory_presets();
    if let Ok(index) = name.trim().parse::<usize>() {
        return (index < presets.len()).then_some(index);
    }
    presets
        .iter()
        .position(|p| p.name.eq_ignore_ascii_case(name.trim()))
}
