//! CLI configuration utilities

use anyhow::{Context, Result};
use pm_panel_core::{FileStore, PanelSettings};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// Platform default location of the settings file
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pm-panel").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Load settings from `path`, or from the default file if it exists
pub fn load_settings(path: Option<&Path>) -> Result<PanelSettings> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    };

    PanelSettings::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load settings from {}", path.display()),
        None => "Failed to load settings".to_string(),
    })
}

/// Session state file: the explicit one, else the platform default
pub fn state_file_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(FileStore::default_path)
        .context("No data directory available, pass --state-file")
}

/// Render effective settings as pretty JSON
pub fn describe(settings: &PanelSettings, effective_api_base: &str) -> Result<String> {
    let mut value = serde_json::to_value(settings)?;
    value["effective_api_base"] = serde_json::Value::String(effective_api_base.to_string());
    Ok(serde_json::to_string_pretty(&value)?)
}
