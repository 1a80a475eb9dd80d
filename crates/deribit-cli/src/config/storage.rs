//! Config file storage.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::StoredConfig;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Get the config file path.
pub fn config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "deribit").context("Could not determine config directory")?;

    let config_dir = dirs.config_dir();
    fs::create_dir_all(config_dir).context("Failed to create config directory")?;

    Ok(config_dir.join("config.json"))
}

/// Save the config to disk, readable by the owner only.
pub fn save_config(config: &StoredConfig) -> Result<PathBuf> {
    let path = config_path()?;
    let json = serde_json::to_string_pretty(config)?;

    fs::write(&path, &json).context("Failed to write config file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

/// Load the config from disk, if one was saved.
pub fn load_config() -> Result<Option<StoredConfig>> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read config file")?;
    let config = serde_json::from_str(&json).context("Invalid config file")?;

    Ok(Some(config))
}
