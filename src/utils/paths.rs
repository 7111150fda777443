//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Smart Tagging directory (~/.smart-tagging/)
pub fn smart_tagging_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".smart-tagging"))
}

/// Get the config file path (~/.smart-tagging/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(smart_tagging_dir()?.join("config.json"))
}

/// Get the default database file path (~/.smart-tagging/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(smart_tagging_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
