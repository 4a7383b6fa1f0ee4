//! User preset files.

use std::collections::BTreeMap;
use std::path::Path;

use jovian_synth::{ModDestination, Param, Preset};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::paths;
use crate::validation::{ValidationError, validate_hub, validate_param};

/// A named sound stored as TOML.
///
/// Parameters are keyed by their string id and hub destinations by theirs.
/// Keys left out take the defaults of a fresh preset; unknown keys are
/// rejected.
///
/// # TOML Format
///
/// ```toml
/// name = "Warm Pad"
///
/// [params]
/// dco1_wave = 1
/// cutoff = 58
/// amp_attack = 60
///
/// [hub]
/// lfo_to_pwm = 40
/// unison_detune = 70
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserPreset {
    /// Display name.
    pub name: String,

    /// Parameter values keyed by string id.
    #[serde(default)]
    pub params: BTreeMap<String, i32>,

    /// Raw 0..=100 hub values keyed by destination id.
    #[serde(default)]
    pub hub: BTreeMap<String, i32>,
}

impl UserPreset {
    /// Create an empty preset: every value at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
            hub: BTreeMap::new(),
        }
    }

    /// Snapshot every value of `preset` under `name`.
    pub fn from_preset(name: impl Into<String>, preset: &Preset) -> Self {
        let params = Param::ALL
            .into_iter()
            .map(|p| (p.descriptor().string_id.to_string(), preset.get(p)))
            .collect();
        let hub = ModDestination::ALL
            .into_iter()
            .map(|d| (d.descriptor().string_id.to_string(), i32::from(preset.hub_raw(d))))
            .collect();
        Self {
            name: name.into(),
            params,
            hub,
        }
    }

    /// Set a parameter by string id.
    pub fn with_param(mut self, id: impl Into<String>, value: i32) -> Self {
        self.params.insert(id.into(), value);
        self
    }

    /// Set a hub value by destination id.
    pub fn with_hub(mut self, id: impl Into<String>, raw: i32) -> Self {
        self.hub.insert(id.into(), raw);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), name = %preset.name, "loaded user preset");
        Ok(preset)
    }

    /// Parse a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), name = %self.name, "saved user preset");
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the name, every key and every value.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for (key, &value) in &self.params {
            validate_param(lookup_param(key)?, value)?;
        }
        for (key, &raw) in &self.hub {
            validate_hub(lookup_destination(key)?, raw)?;
        }
        Ok(())
    }

    /// Build the engine preset. Values are clamped; unknown keys fail.
    pub fn to_preset(&self) -> Result<Preset> {
        let mut preset = Preset::default();
        for (key, &value) in &self.params {
            preset.set(lookup_param(key)?, value);
        }
        for (key, &raw) in &self.hub {
            let dest = lookup_destination(key)?;
            preset.set_hub_raw(dest, raw.clamp(0, 100) as u8);
        }
        Ok(preset)
    }
}

/// Parameter for an exact string id.
pub fn lookup_param(key: &str) -> Result<Param> {
    Param::ALL
        .into_iter()
        .find(|p| p.descriptor().string_id == key)
        .ok_or_else(|| ConfigError::UnknownParameter(key.to_string()))
}

/// Hub destination for an exact string id.
pub fn lookup_destination(key: &str) -> Result<ModDestination> {
    ModDestination::ALL
        .into_iter()
        .find(|d| d.descriptor().string_id == key)
        .ok_or_else(|| ConfigError::UnknownDestination(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jovian_synth::factory_presets;

    #[test]
    fn test_empty_preset_is_default() {
        let preset = UserPreset::new("Blank").to_preset().unwrap();
        assert_eq!(preset, Preset::default());
    }

    #[test]
    fn test_parse_partial() {
        let toml = r#"
            name = "Warm Pad"

            [params]
            cutoff = 58
            amp_attack = 60

            [hub]
            lfo_to_pwm = 40
        "#;
        let user = UserPreset::from_toml(toml).unwrap();
        user.validate().unwrap();
        let preset = user.to_preset().unwrap();
        assert_eq!(preset.get(Param::Cutoff), 58);
        assert_eq!(preset.get(Param::AmpAttack), 60);
        assert_eq!(preset.hub_raw(ModDestination::LfoToPwm), 40);
        assert_eq!(preset.get(Param::Resonance), Preset::default().get(Param::Resonance));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let bad_param = UserPreset::new("x").with_param("dco3_wave", 1);
        assert!(matches!(bad_param.to_preset(), Err(ConfigError::UnknownParameter(k)) if k == "dco3_wave"));

        let bad_hub = UserPreset::new("x").with_hub("ring_mod", 1);
        assert!(matches!(bad_hub.validate(), Err(ConfigError::UnknownDestination(_))));

        // Display names are not keys
        assert!(UserPreset::new("x").with_param("CUTOFF", 1).to_preset().is_err());

        let top_level = "name = \"x\"\ncolor = \"red\"\n";
        assert!(matches!(UserPreset::from_toml(top_level), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_out_of_range_fails_validation_but_clamps() {
        let user = UserPreset::new("Loud").with_param("cutoff", 250).with_hub("tremolo", 120);
        assert!(matches!(user.validate(), Err(ConfigError::Validation(_))));
        let preset = user.to_preset().unwrap();
        assert_eq!(preset.get(Param::Cutoff), 100);
        assert_eq!(preset.hub_raw(ModDestination::Tremolo), 100);
    }

    #[test]
    fn test_factory_snapshot_round_trip() {
        for factory in factory_presets() {
            let user = UserPreset::from_preset(factory.name, &factory.preset);
            assert_eq!(user.params.len(), Param::ALL.len());
            assert_eq!(user.hub.len(), ModDestination::ALL.len());
            user.validate().unwrap();

            let parsed = UserPreset::from_toml(&user.to_toml().unwrap()).unwrap();
            assert_eq!(parsed, user);
            assert_eq!(parsed.to_preset().unwrap(), factory.preset);
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            UserPreset::new("  ").validate(),
            Err(ConfigError::Validation(ValidationError::EmptyName))
        ));
    }
}
