//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::ValueEnum;
use jovian_config::{EngineConfig, load_named_preset};
use jovian_synth::{ModDestination, Param, SynthEngine};
use std::path::Path;

/// Voice mode override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One voice, last-note priority
    Mono,
    /// Six voices
    Poly,
    /// Stacked detuned copies
    Unison,
}

impl ModeArg {
    /// Raw hub value selecting this mode.
    pub fn hub_raw(self) -> i32 {
        match self {
            ModeArg::Mono => 0,
            ModeArg::Poly => 50,
            ModeArg::Unison => 100,
        }
    }
}

/// Load `path`, or the user config (defaults when absent).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::load_or_default().context("loading user config")?,
    };
    config.validate()?;
    Ok(config)
}

/// Build a configured engine at `sample_rate`, optionally overriding the
/// preset and the voice mode.
pub fn build_engine(
    config: &EngineConfig,
    sample_rate: u32,
    preset: Option<&str>,
    mode: Option<ModeArg>,
) -> anyhow::Result<SynthEngine> {
    let mut engine = SynthEngine::new();
    engine.init(sample_rate as f32);
    config.apply(&mut engine)?;

    if let Some(name) = preset {
        load_named_preset(&mut engine, name).with_context(|| {
            format!("preset '{name}' not found; run 'jovian presets --user' to list presets")
        })?;
    }
    if let Some(mode) = mode {
        let selected = engine.parameter(Param::ModHub.index() as u8);
        engine.set_parameter(Param::ModHub.index() as u8, ModDestination::Mode.index() as i32);
        engine.set_parameter(Param::ModAmount.index() as u8, mode.hub_raw());
        engine.set_parameter(Param::ModHub.index() as u8, selected);
    }
    tracing::debug!(
        sample_rate,
        preset = preset.unwrap_or(&config.default_preset),
        mode = ?engine.mode(),
        "engine ready"
    );
    Ok(engine)
}

/// Parse a comma-separated note list: MIDI numbers or names like `C4`, `F#3`, `Bb2`.
pub fn parse_notes(s: &str) -> Result<Vec<u8>, String> {
    let notes = s
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(parse_note)
        .collect::<Result<Vec<u8>, String>>()?;
    if notes.is_empty() {
        return Err("expected at least one note".to_string());
    }
    Ok(notes)
}

fn parse_note(s: &str) -> Result<u8, String> {
    if let Ok(n) = s.parse::<u8>() {
        return if n <= 127 {
            Ok(n)
        } else {
            Err(format!("note {n} out of range 0-127"))
        };
    }

    let mut chars = s.chars();
    let letter = chars.next().ok_or("empty note")?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(format!("invalid note '{s}'")),
    };
    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave
        .parse()
        .map_err(|_| format!("invalid octave in note '{s}'"))?;
    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi)
        .ok()
        .filter(|&n| n <= 127)
        .ok_or_else(|| format!("note '{s}' out of range"))
}
