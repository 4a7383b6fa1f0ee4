//! Jovian CLI - render, play and manage sounds of the jovian synthesizer.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jovian")]
#[command(author, version, about = "Jovian polyphonic synthesizer", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config file (defaults to the user config)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List factory and user presets
    Presets(commands::presets::PresetsArgs),

    /// List parameters or modulation hub destinations
    Params(commands::params::ParamsArgs),

    /// Render a chord to a WAV file
    Render(commands::render::RenderArgs),

    /// Hold a chord on the default output device until Ctrl+C
    Play(commands::play::PlayArgs),

    /// Write a factory preset to a user preset file
    ExportPreset(commands::export_preset::ExportPresetArgs),

    /// Validate a config or user preset file
    Check(commands::check::CheckArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Play(args) => commands::play::run(args, config),
        Commands::ExportPreset(args) => commands::export_preset::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
