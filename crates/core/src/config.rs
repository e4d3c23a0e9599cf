//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` in the user's
//! config directory, then `TRANSIT_MEMORY_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::save::SaveManager;

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "transit-memory";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "TRANSIT_MEMORY";

/// Runtime settings for the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the GeoJSON data (`<city>/<kind>/<line>.geojson`).
    pub data_root: PathBuf,
    /// Save file location.
    pub save_path: PathBuf,
    /// How many recent guesses the play screen lists.
    pub recent_guesses: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            save_path: SaveManager::default_path(),
            recent_guesses: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the optional config file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_root", defaults.data_root.to_string_lossy().to_string())?
            .set_default("save_path", defaults.save_path.to_string_lossy().to_string())?
            .set_default("recent_guesses", defaults.recent_guesses as i64)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .context("invalid configuration values")
    }
}

/// Location of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("geojson")
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let contents = default_config_contents(&AppConfig::default());
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

fn default_config_contents(defaults: &AppConfig) -> String {
    format!(
        "# Directory containing <city>/<kind>/<line>.geojson files.\n\
         data_root = {}\n\
         \n\
         # Where the current game is saved.\n\
         save_path = {}\n\
         \n\
         # Number of recent guesses shown while playing.\n\
         recent_guesses = {}\n",
        toml_string(&defaults.data_root),
        toml_string(&defaults.save_path),
        defaults.recent_guesses,
    )
}

// Quoted and escaped as a TOML string value.
fn toml_string(path: &Path) -> String {
    toml::Value::String(path.to_string_lossy().into_owned()).to_string()
}
