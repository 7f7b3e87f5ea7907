//! Configuration management for hookwright.
//!
//! This module provides multi-layer configuration support with:
//! - File-based configuration
//! - Environment variable overrides
//! - Programmatic updates
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Environment variables (`HOOKWRIGHT_CORE_VERSION=9` sets `core_version`)
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use hookwright_core::config::Config;
//! use hookwright_types::GeneratorConfig;
//!
//! let mut config = Config::load("hookwright.yml")?;
//! config.set("docblock_width", 100)?;
//! let generator: GeneratorConfig = config.typed()?;
//! # Ok::<(), hookwright_types::GenerationError>(())
//! ```

use hookwright_types::{GenerationError, GeneratorConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "HOOKWRIGHT_";

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

const LAYERS_BY_PRIORITY: [ConfigLayer; 4] = [
    ConfigLayer::Environment,
    ConfigLayer::Set,
    ConfigLayer::Loaded,
    ConfigLayer::Default,
];

/// Main configuration structure with multi-layer support.
#[derive(Clone, Debug, Default)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
    file_path: Option<PathBuf>,
}

impl Config {
    /// Create an empty configuration holding only defaults.
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        layers.insert(ConfigLayer::Default, Self::defaults());
        Self {
            layers,
            file_path: None,
        }
    }

    /// Load configuration from a file path, then apply environment overrides.
    ///
    /// If the file doesn't exist, only defaults and environment values apply.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::new();

        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| GenerationError::Config(format!("Failed to read config file: {}", e)))?;

            let value: Value = serde_yaml::from_str(&content)
                .map_err(|e| GenerationError::Config(format!("Failed to parse config: {}", e)))?;

            if !value.is_null() {
                config.layers.insert(ConfigLayer::Loaded, value);
            }
        }

        config.file_path = Some(path.to_path_buf());
        config.apply_environment(std::env::vars());
        Ok(config)
    }

    /// Load from the default location (`~/.hookwright/config.yml`).
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::new();
                config.apply_environment(std::env::vars());
                Ok(config)
            }
        }
    }

    /// Get the default configuration file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".hookwright").join("config.yml"))
    }

    /// Populate the environment layer from `HOOKWRIGHT_*` variables.
    ///
    /// Values are parsed as YAML scalars so numbers and booleans keep their type.
    pub fn apply_environment<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env_layer = Value::Object(Default::default());

        for (key, raw) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path = name.to_lowercase().replace("__", ".");
            let value = serde_yaml::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
            if let Err(e) = Self::set_value_at_path(&mut env_layer, &path, value) {
                warn!(variable = %key, error = %e, "Ignoring environment override");
            }
        }

        if env_layer.as_object().map_or(false, |m| !m.is_empty()) {
            self.layers.insert(ConfigLayer::Environment, env_layer);
        }
    }

    /// Get a configuration value by key, respecting layer priority.
    ///
    /// Returns None if the key doesn't exist in any layer.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        for layer in &LAYERS_BY_PRIORITY {
            if let Some(layer_data) = self.layers.get(layer) {
                if let Some(value) = Self::get_value_at_path(layer_data, key) {
                    if let Ok(typed_value) = serde_json::from_value(value.clone()) {
                        return Some(typed_value);
                    }
                }
            }
        }

        None
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| GenerationError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self
            .layers
            .entry(ConfigLayer::Set)
            .or_insert(Value::Object(Default::default()));

        Self::set_value_at_path(set_layer, key, value)
    }

    /// Deserialize the merged layers into the typed generator configuration.
    pub fn typed(&self) -> Result<GeneratorConfig> {
        serde_json::from_value(self.merged_data())
            .map_err(|e| GenerationError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Save the file and programmatic layers to the configuration file.
    pub fn save(&self) -> Result<()> {
        let path = self.file_path.as_ref().ok_or_else(|| {
            GenerationError::Config("Cannot save: no file path set".to_string())
        })?;

        let mut persisted = Value::Object(Default::default());
        for layer in [ConfigLayer::Loaded, ConfigLayer::Set] {
            if let Some(data) = self.layers.get(&layer) {
                persisted = crate::util::data::overlay(persisted, data.clone());
            }
        }

        let yaml = serde_yaml::to_string(&persisted)
            .map_err(|e| GenerationError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, yaml)
            .map_err(|e| GenerationError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        let mut merged = Value::Object(serde_json::Map::new());

        for layer in LAYERS_BY_PRIORITY.iter().rev() {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = crate::util::data::overlay(merged, layer_data.clone());
            }
        }

        merged
    }

    fn defaults() -> Value {
        serde_json::to_value(GeneratorConfig::default())
            .unwrap_or_else(|_| Value::Object(Default::default()))
    }

    // Helper: Get value at dotted path
    fn get_value_at_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
        let mut current = data;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    // Helper: Set value at dotted path, creating intermediate objects
    fn set_value_at_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
        let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(GenerationError::Config("Empty path".to_string()));
        };

        let mut current = data;
        for part in parents {
            if !current.is_object() {
                *current = Value::Object(Default::default());
            }
            current = match current {
                Value::Object(map) => map
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(Default::default())),
                _ => {
                    return Err(GenerationError::Config(format!(
                        "Cannot set value at path: {}",
                        path
                    )))
                }
            };
        }

        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        if let Value::Object(map) = current {
            map.insert(last.to_string(), value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_layers() {
        let mut config = Config::new();
        config.layers.insert(
            ConfigLayer::Loaded,
            serde_json::json!({"docblock_width": 100}),
        );

        let width: usize = config.get("docblock_width").unwrap();
        assert_eq!(width, 100);

        config.set("docblock_width", 120).unwrap();
        let width: usize = config.get("docblock_width").unwrap();
        assert_eq!(width, 120);
    }

    #[test]
    fn test_environment_layer_wins() {
        let mut config = Config::new();
        config.set("core_version", 10).unwrap();
        config.apply_environment(vec![
            ("HOOKWRIGHT_CORE_VERSION".to_string(), "9".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ]);

        let typed = config.typed().unwrap();
        assert_eq!(typed.core_version.major(), 9);
    }

    #[test]
    fn test_environment_without_key_is_ignored() {
        let mut config = Config::new();
        config.apply_environment(vec![
            ("HOOKWRIGHT_".to_string(), "9".to_string()),
            ("HOOKWRIGHT_DOCBLOCK_WIDTH".to_string(), "100".to_string()),
        ]);

        let typed = config.typed().unwrap();
        assert_eq!(typed.docblock_width, 100);
        assert_eq!(typed.core_version.major(), 10);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.yml")).unwrap();
        let typed = config.typed().unwrap();
        assert_eq!(typed.docblock_width, 80);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::load(&path).unwrap();
        config.set("docblock_width", 90).unwrap();
        config.save().unwrap();

        let reloaded = Config::load(&path).unwrap();
        let width: usize = reloaded.get("docblock_width").unwrap();
        assert_eq!(width, 90);
    }
}
