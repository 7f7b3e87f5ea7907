//! Metadata tables: hooks, plugin types, and services.
//!
//! A built-in table covers the common cases. Callers with access to a real
//! framework installation can load a collected table from YAML instead, or
//! extend the built-in one.

use hookwright_types::{GenerationError, HookInfo, MetadataSource, PluginTypeInfo, Result, ServiceInfo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN: &str = include_str!("metadata.yml");

/// On-disk shape of a metadata table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataTable {
    /// Hooks
    #[serde(default)]
    pub hooks: Vec<HookInfo>,
    /// Plugin types
    #[serde(default)]
    pub plugin_types: Vec<PluginTypeInfo>,
    /// Services
    #[serde(default)]
    pub services: Vec<ServiceInfo>,
}

/// In-memory metadata tables, keyed for lookup.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    hooks: IndexMap<String, HookInfo>,
    plugin_types: IndexMap<String, PluginTypeInfo>,
    services: IndexMap<String, ServiceInfo>,
}

impl StaticMetadata {
    /// The built-in table.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN)
    }

    /// Parse a table from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let table: MetadataTable = serde_yaml::from_str(content)
            .map_err(|e| GenerationError::Config(format!("Failed to parse metadata table: {}", e)))?;
        Ok(Self::from_table(table))
    }

    /// Load a table from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GenerationError::Config(format!(
                "Failed to read metadata table {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build from a deserialized table.
    pub fn from_table(table: MetadataTable) -> Self {
        let mut metadata = Self::default();
        metadata.extend(table);
        metadata
    }

    /// Add or replace entries.
    pub fn extend(&mut self, table: MetadataTable) {
        for hook in table.hooks {
            self.hooks.insert(hook.name.clone(), hook);
        }
        for plugin_type in table.plugin_types {
            self.plugin_types.insert(plugin_type.id.clone(), plugin_type);
        }
        for service in table.services {
            self.services.insert(service.id.clone(), service);
        }
    }
}

impl MetadataSource for StaticMetadata {
    fn hook(&self, name: &str) -> Option<&HookInfo> {
        self.hooks.get(name)
    }

    fn hooks(&self) -> Vec<&HookInfo> {
        self.hooks.values().collect()
    }

    fn plugin_type(&self, id: &str) -> Option<&PluginTypeInfo> {
        self.plugin_types.get(id)
    }

    fn plugin_types(&self) -> Vec<&PluginTypeInfo> {
        self.plugin_types.values().collect()
    }

    fn service(&self, id: &str) -> Option<&ServiceInfo> {
        self.services.get(id)
    }

    fn services(&self) -> Vec<&ServiceInfo> {
        self.services.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let metadata = StaticMetadata::builtin().unwrap();

        let help = metadata.hook("hook_help").unwrap();
        assert_eq!(help.destination_for("test_module"), "test_module.module");
        assert_eq!(help.body[1], "  case 'help.page.%module':");

        let tokens = metadata.hook("hook_tokens").unwrap();
        assert_eq!(tokens.destination_for("test_module"), "test_module.tokens.inc");

        let block = metadata.plugin_type("block").unwrap();
        assert_eq!(block.base_class, "Drupal\\Core\\Block\\BlockBase");
        assert!(block.methods.contains_key("build"));

        assert_eq!(
            metadata.service("entity_type.manager").unwrap().variable_name,
            "entityTypeManager"
        );
    }

    #[test]
    fn test_missing_entry_is_input_error() {
        let metadata = StaticMetadata::builtin().unwrap();
        let err = metadata.require_hook("hook_nope", "hooks/0").unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("hooks/0"));
    }

    #[test]
    fn test_extend_replaces_entries() {
        let mut metadata = StaticMetadata::builtin().unwrap();
        let table = MetadataTable {
            services: vec![ServiceInfo {
                id: "current_user".to_string(),
                interface: "Drupal\\Core\\Session\\AccountInterface".to_string(),
                variable_name: "account".to_string(),
                description: String::new(),
            }],
            ..Default::default()
        };
        metadata.extend(table);
        assert_eq!(metadata.service("current_user").unwrap().variable_name, "account");
    }
}
