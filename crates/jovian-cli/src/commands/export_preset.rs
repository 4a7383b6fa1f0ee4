//! Export a factory preset to an editable user file.

use anyhow::Context;
use clap::Args;
use jovian_config::{UserPreset, factory_index, paths};
use jovian_synth::factory_presets;
use std::path::PathBuf;

#[derive(Args)]
pub struct ExportPresetArgs {
    /// Factory preset name or number
    preset: String,

    /// Output file (defaults to the user presets directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name stored in the file (defaults to the factory name)
    #[arg(short, long)]
    name: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ExportPresetArgs) -> anyhow::Result<()> {
    let index = factory_index(&args.preset).with_context(|| {
        format!("no factory preset '{}'; run 'jovian presets' to list them", args.preset)
    })?;
    let factory = factory_presets()[index];
    let name = args.name.unwrap_or_else(|| factory.name.to_string());

    let path = match args.output {
        Some(path) => path,
        None => paths::ensure_user_presets_dir()?.join(paths::preset_file_name(&name)),
    };
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    UserPreset::from_preset(name.as_str(), &factory.preset)
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Exported '{}' to {}", factory.name, path.display());
    Ok(())
}
