//! Config and preset file validation.

use anyhow::Context;
use clap::{Args, ValueEnum};
use jovian_config::{EngineConfig, UserPreset};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileKind {
    /// Decide from the contents: files with a `name` key are presets
    Auto,
    /// Engine config
    Config,
    /// User preset
    Preset,
}

#[derive(Args)]
pub struct CheckArgs {
    /// File to validate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// What the file is
    #[arg(long, value_enum, default_value_t = FileKind::Auto)]
    kind: FileKind,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let kind = match args.kind {
        FileKind::Auto => detect(&args.file)?,
        kind => kind,
    };

    match kind {
        FileKind::Preset => {
            let preset = UserPreset::load(&args.file)?;
            preset.validate()?;
            println!(
                "{}: preset '{}' OK ({} params, {} hub values)",
                args.file.display(),
                preset.name,
                preset.params.len(),
                preset.hub.len()
            );
        }
        _ => {
            let config = EngineConfig::load(&args.file)?;
            config.validate()?;
            println!(
                "{}: config OK ({} Hz, {} frames, preset '{}')",
                args.file.display(),
                config.sample_rate,
                config.buffer_size,
                config.default_preset
            );
        }
    }
    Ok(())
}

fn detect(path: &Path) -> anyhow::Result<FileKind> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let table: toml::Table = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(if table.contains_key("name") {
        FileKind::Preset
    } else {
        FileKind::Config
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_kind() {
        let dir = TempDir::new().unwrap();
        let preset = dir.path().join("p.toml");
        std::fs::write(&preset, "name = \"x\"\n[params]\ncutoff = 3\n").unwrap();
        let config = dir.path().join("c.toml");
        std::fs::write(&config, "unison_voices = 3\n").unwrap();

        assert_eq!(detect(&preset).unwrap(), FileKind::Preset);
        assert_eq!(detect(&config).unwrap(), FileKind::Config);
    }

    #[test]
    fn test_check_reports_bad_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "name = \"x\"\n[hub]\nportamento = 400\n").unwrap();
        let result = run(CheckArgs {
            file: path,
            kind: FileKind::Auto,
        });
        assert!(result.is_err());
    }
}
