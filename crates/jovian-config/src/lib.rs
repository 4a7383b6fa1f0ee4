//! Configuration and user presets for the jovian synthesizer.
//!
//! The engine itself is configuration-free: it clamps what it is given and
//! never touches the filesystem. This crate is the host-side layer that
//! reads and writes TOML.
//!
//! # Features
//!
//! - **Engine config**: device request, unison size, voice allocation,
//!   steal fade, default preset and effect override
//! - **User presets**: sparse TOML snapshots keyed by parameter id
//! - **Validation**: range checks with readable errors
//! - **Paths**: platform config directory via `dirs`
//!
//! # Example
//!
//! ```rust,no_run
//! use jovian_config::{EngineConfig, UserPreset, paths};
//! use jovian_synth::SynthEngine;
//!
//! let config = EngineConfig::load_or_default().unwrap();
//! let mut engine = SynthEngine::new();
//! engine.init(config.sample_rate as f32);
//! config.apply(&mut engine).unwrap();
//!
//! let snapshot = UserPreset::from_preset("Mine", &engine.current_preset());
//! snapshot.save(paths::user_presets_dir().join("mine.toml")).unwrap();
//! ```

mod engine_config;
mod error;
mod user_preset;

/// Platform-specific paths for the config file and presets.
pub mod paths;

/// Value range checks.
pub mod validation;

pub use engine_config::{
    Allocation, Effect, EngineConfig, MAX_SAMPLE_RATE, MAX_STEAL_RELEASE_MS, MIN_SAMPLE_RATE,
    OutputConfig, factory_index, load_named_preset,
};
pub use error::{ConfigError, Result};
pub use user_preset::{UserPreset, lookup_destination, lookup_param};
pub use validation::ValidationError;
