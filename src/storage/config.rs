//! JSON Configuration Management
//!
//! Reads the configuration file and layers `SMART_TAGGING_*` environment
//! overrides on top.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir, smart_tagging_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Load ~/.smart-tagging/config.json, creating it with defaults if missing,
    /// then apply environment overrides.
    pub fn new() -> AppResult<Self> {
        // Ensure the config directory exists
        ensure_dir(&smart_tagging_dir()?)?;

        let config_path = config_path()?;
        if !config_path.exists() {
            Self::save_to_file(&config_path, &AppConfig::default())?;
        }

        Self::from_path(config_path)
    }

    /// Load configuration from an explicit path (defaults when the file is
    /// absent), then apply environment overrides.
    pub fn from_path(path: impl Into<PathBuf>) -> AppResult<Self> {
        Self::from_path_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`ConfigService::from_path`] with a custom environment lookup.
    pub fn from_path_with_env<F>(path: impl Into<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = path.into();
        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides(lookup);
        config.validate().map_err(AppError::config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Consume the service, keeping only the configuration
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Path the configuration was read from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
