//! Preset listing.

use clap::Args;
use jovian_config::{UserPreset, paths};
use jovian_synth::factory_presets;

#[derive(Args)]
pub struct PresetsArgs {
    /// Also list user presets from the config directory
    #[arg(long)]
    user: bool,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    println!("Factory presets:");
    for (index, preset) in factory_presets().iter().enumerate() {
        println!("  {index}  {}", preset.name);
    }

    if args.user {
        let dir = paths::user_presets_dir();
        println!("\nUser presets ({}):", dir.display());
        let files = paths::list_user_presets();
        if files.is_empty() {
            println!("  (none)");
        }
        for path in files {
            let stem = paths::preset_name_from_path(&path).unwrap_or_default();
            match UserPreset::load(&path) {
                Ok(preset) => println!("  {stem:<20} {}", preset.name),
                Err(e) => println!("  {stem:<20} (unreadable: {e})"),
            }
        }
    }

    Ok(())
}
