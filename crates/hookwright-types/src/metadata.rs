//! Records supplied by metadata collectors.
//!
//! These describe the hooks, plugin types, and services available in a target
//! framework installation. Generators look them up by name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One hook that extensions may implement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInfo {
    /// Full hook name, e.g. `hook_form_alter`
    pub name: String,

    /// File the implementation lives in; `%module` is replaced with the
    /// extension's machine name
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Function signature with `hook` as the name placeholder
    pub definition: String,

    /// One-line description used for the implementation docblock
    #[serde(default)]
    pub description: String,

    /// Function body lines
    #[serde(default)]
    pub body: Vec<String>,

    /// Grouping label (the API file the hook is documented in)
    #[serde(default)]
    pub group: String,
}

fn default_destination() -> String {
    "%module.module".to_string()
}

impl HookInfo {
    /// Short name without the `hook_` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("hook_").unwrap_or(&self.name)
    }

    /// Destination file name for an extension.
    pub fn destination_for(&self, machine_name: &str) -> String {
        self.destination.replace("%module", machine_name)
    }
}

/// A plugin type that extensions can provide plugins for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginTypeInfo {
    /// Plugin type id, e.g. `block`
    pub id: String,

    /// Namespace subdirectory below `Plugin`, e.g. `Block`
    pub subdir: String,

    /// Fully-qualified base class
    pub base_class: String,

    /// Fully-qualified annotation class (annotation discovery)
    pub annotation_class: String,

    /// Fully-qualified attribute class (attribute discovery)
    #[serde(default)]
    pub attribute_class: Option<String>,

    /// Definition keys and their default values; `label`-like keys whose
    /// value is `"@translation"` are rendered as translatable text
    #[serde(default)]
    pub definition_keys: IndexMap<String, String>,

    /// Methods the plugin class must implement: name to body lines
    #[serde(default)]
    pub methods: IndexMap<String, PluginMethodInfo>,
}

/// A method stub generated for a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMethodInfo {
    /// Full declaration, e.g. `public function build()`
    pub declaration: String,
    /// Body lines
    #[serde(default)]
    pub body: Vec<String>,
}

/// A service that generated classes may have injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service id, e.g. `entity_type.manager`
    pub id: String,

    /// Fully-qualified interface used as the type hint
    pub interface: String,

    /// Property/variable name, e.g. `entityTypeManager`
    pub variable_name: String,

    /// Short description for docblocks
    #[serde(default)]
    pub description: String,
}
