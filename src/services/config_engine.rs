// Gallery Config Engine
// Loads, saves and updates the gallery configuration.
// The configuration is a JSON file; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::types::config::GalleryConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config engine interface.
pub trait ConfigEngineTrait {
    fn load(&mut self) -> Result<GalleryConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config(&self) -> &GalleryConfig;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError>;
    fn reset(&mut self) -> Result<(), ConfigError>;
    fn config_path(&self) -> &Path;
}

/// Config engine persisting [`GalleryConfig`] as JSON on disk.
pub struct ConfigEngine {
    config_path: PathBuf,
    config: GalleryConfig,
}

impl ConfigEngine {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            config: GalleryConfig::default(),
        }
    }
}

impl ConfigEngineTrait for ConfigEngine {
    /// Loads the config file, or the defaults when it does not exist.
    ///
    /// Fields absent from the file take their default values. A malformed
    /// file is an error.
    fn load(&mut self) -> Result<GalleryConfig, ConfigError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            self.config = GalleryConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::Io(format!("Failed to read config file: {}", e)))?;

        self.config = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Serialization(format!("Failed to parse config file: {}", e))
        })?;
        info!(path = %self.config_path.display(), "config loaded");
        Ok(self.config.clone())
    }

    /// Writes the current config, creating parent directories as needed.
    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::Serialization(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| ConfigError::Io(format!("Failed to write config file: {}", e)))
    }

    fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Updates one value by dot path and saves.
    ///
    /// - `"reaction_countdown_ms"` updates the reaction grace window
    /// - `"key_bindings.close_overlay"` rebinds the close key
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.config).map_err(|e| {
            ConfigError::Serialization(format!("Failed to serialize config: {}", e))
        })?;

        let (last, path) = parts
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        let mut current = &mut json_value;
        for part in path {
            current = current
                .get_mut(*part)
                .ok_or_else(|| ConfigError::InvalidKey(format!("Key '{}' not found", key)))?;
        }
        match current {
            serde_json::Value::Object(map) if map.contains_key(*last) => {
                map.insert((*last).to_string(), value);
            }
            _ => {
                return Err(ConfigError::InvalidKey(format!("Key '{}' not found", key)));
            }
        }

        self.config = serde_json::from_value(json_value).map_err(|e| {
            ConfigError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.save()
    }

    /// Restores the defaults and saves them.
    fn reset(&mut self) -> Result<(), ConfigError> {
        self.config = GalleryConfig::default();
        self.save()
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
