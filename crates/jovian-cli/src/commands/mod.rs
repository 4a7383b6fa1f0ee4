//! CLI subcommands.

pub mod check;
pub mod common;
pub mod export_preset;
pub mod params;
pub mod play;
pub mod presets;
pub mod render;
