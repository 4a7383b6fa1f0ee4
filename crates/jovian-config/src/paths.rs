//! Platform-specific paths for the config file and user presets.
//!
//! # Directory Structure
//!
//! - **Config dir**: `~/.config/jovian/` (Linux), `~/Library/Application Support/jovian/` (macOS), `%APPDATA%\jovian\` (Windows)
//! - **Config file**: `<config dir>/config.toml`
//! - **User presets**: `<config dir>/presets/*.toml`
//!
//! # Example
//!
//! ```rust,no_run
//! use jovian_config::paths;
//!
//! println!("config: {}", paths::config_file().display());
//! for path in paths::list_user_presets() {
//!     println!("preset: {}", path.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Application name used for directory paths.
const APP_NAME: &str = "jovian";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// File name of the engine configuration.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the user configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Returns the path of the engine configuration file.
pub fn config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

/// Ensure the user presets directory exists and return it.
pub fn ensure_user_presets_dir() -> Result<PathBuf> {
    let dir = user_presets_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

/// List preset files in the user presets directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// List `*.toml` files in `dir`, sorted by path.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Find a user preset file.
///
/// `name` may be a path to an existing file, or a preset name looked up
/// (with or without `.toml`) in the user presets directory.
pub fn find_user_preset(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let user_path = user_presets_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// Preset name from a file path (the file stem).
///
/// ```rust
/// use jovian_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/warm_pad.toml"));
/// assert_eq!(name.as_deref(), Some("warm_pad"));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// File name for a preset called `name`: lowercase, non-alphanumerics
/// folded to `_`.
pub fn preset_file_name(name: &str) -> String {
    let mut stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        stem.push_str("preset");
    }
    format!("{stem}.toml")
}
