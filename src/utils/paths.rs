use anyhow::{Result, anyhow};
use std::path::PathBuf;

/// Application data directory, `~/.tasktick` by default. The
/// `TASKTICK_DATA_DIR` environment variable overrides it (used by tests and
/// scripted setups).
pub fn get_tasktick_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKTICK_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".tasktick"))
}

pub fn get_database_path() -> Result<PathBuf> {
    Ok(get_tasktick_dir()?.join("tasks.db"))
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_tasktick_dir()?.join("config.toml"))
}

pub fn get_logs_dir() -> Result<PathBuf> {
    Ok(get_tasktick_dir()?.join("logs"))
}

/// Default target for the HTML export.
pub fn get_default_export_path() -> Result<PathBuf> {
    Ok(get_tasktick_dir()?.join("tasks.html"))
}
