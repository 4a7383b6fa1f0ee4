//! Integration tests for jovian-config.
//!
//! Files on disk through to a configured, sounding engine.

use jovian_config::{
    ConfigError, Effect, EngineConfig, UserPreset, load_named_preset, paths::list_presets_in_dir,
};
use jovian_synth::{EffectMode, MAX_FRAMES, ModDestination, Param, SynthEngine, factory_presets};
use tempfile::TempDir;

fn engine() -> SynthEngine {
    let mut engine = SynthEngine::new();
    engine.init(48_000.0);
    engine
}

// ============================================================================
// 1. Engine config files
// ============================================================================

#[test]
fn config_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = EngineConfig {
        sample_rate: 44_100,
        buffer_size: 128,
        unison_voices: 7,
        steal_release_ms: 8.0,
        default_preset: "Pad 1".to_string(),
        ..Default::default()
    };
    config.save(&path).unwrap();
    assert!(path.is_file());

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn config_drives_engine() {
    let config = EngineConfig::from_toml(
        r#"
        unison_voices = 2
        allocation = "first-available"
        default_preset = "brass 1"

        [output]
        effect = "both"
        "#,
    )
    .unwrap();

    let mut engine = engine();
    config.apply(&mut engine).unwrap();
    assert_eq!(engine.preset_name(engine.preset_index()), Some("Brass 1"));
    assert_eq!(engine.effect_mode(), EffectMode::Both);
    assert_eq!(engine.parameter(Param::Effect.index() as u8), Effect::Both.index());

    engine.note_on(60, 100);
    let mut out = [0.0_f32; MAX_FRAMES * 2];
    let mut peak = 0.0_f32;
    for _ in 0..20 {
        engine.render(&mut out, MAX_FRAMES);
        peak = out.iter().fold(peak, |m, s| m.max(s.abs()));
    }
    assert!(peak > 0.01);
}

// ============================================================================
// 2. User preset files
// ============================================================================

#[test]
fn factory_export_reloads_identically() {
    let dir = TempDir::new().unwrap();
    for factory in factory_presets() {
        let path = dir.path().join(jovian_config::paths::preset_file_name(factory.name));
        UserPreset::from_preset(factory.name, &factory.preset)
            .save(&path)
            .unwrap();

        let reloaded = UserPreset::load(&path).unwrap();
        reloaded.validate().unwrap();
        assert_eq!(reloaded.name, factory.name);
        assert_eq!(reloaded.to_preset().unwrap(), factory.preset);
    }
    assert_eq!(list_presets_in_dir(dir.path()).len(), factory_presets().len());
}

#[test]
fn engine_snapshot_survives_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweak.toml");

    let mut source = engine();
    source.load_preset(4);
    source.set_parameter(Param::Cutoff.index() as u8, 12);
    source.set_parameter(Param::ModHub.index() as u8, ModDestination::Tremolo.index() as i32);
    source.set_parameter(Param::ModAmount.index() as u8, 70);
    UserPreset::from_preset("Tweak", &source.current_preset())
        .save(&path)
        .unwrap();

    let mut target = engine();
    load_named_preset(&mut target, path.to_str().unwrap()).unwrap();
    assert_eq!(target.current_preset(), source.current_preset());
    assert_eq!(target.hub().raw(ModDestination::Tremolo), 70);
}

#[test]
fn handwritten_preset_with_typo_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typo.toml");
    std::fs::write(&path, "name = \"Typo\"\n[params]\ncutof = 40\n").unwrap();

    let preset = UserPreset::load(&path).unwrap();
    assert!(matches!(preset.validate(), Err(ConfigError::UnknownParameter(k)) if k == "cutof"));

    let mut engine = engine();
    let before = engine.current_preset();
    assert!(load_named_preset(&mut engine, path.to_str().unwrap()).is_err());
    assert_eq!(engine.current_preset(), before);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "name = \n").unwrap();
    assert!(matches!(UserPreset::load(&path), Err(ConfigError::TomlParse(_))));
}
