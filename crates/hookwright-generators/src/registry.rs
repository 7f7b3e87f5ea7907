//! Component type registry.
//!
//! The registry maps a component type name to its schema function and its
//! generator factory. One registry is built per process and passed to the
//! engine; there is no global lookup table.

use crate::components;
use crate::generator::Generator;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_types::{LogicError, Result};
use indexmap::IndexMap;
use tracing::debug;

/// Describes a component type's own properties.
pub type SchemaFn = fn() -> Vec<PropertyDefinition>;

/// Builds a generator from request data that has had defaults applied.
pub type FactoryFn = fn(DataItem) -> Box<dyn Generator>;

/// One registered component type.
#[derive(Clone)]
pub struct ComponentType {
    /// Type name, e.g. `service`
    pub name: &'static str,
    /// One-line description for listings
    pub description: &'static str,
    /// Schema of the type's request data
    pub schema: SchemaFn,
    /// Generator factory
    pub factory: FactoryFn,
    /// Whether the type can be requested at the top level
    pub root: bool,
}

impl ComponentType {
    /// The type's own top-level definition, without embedded component schemas.
    pub fn definition(&self) -> PropertyDefinition {
        PropertyDefinition::root(self.name, (self.schema)())
    }
}

impl std::fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}

/// Registered component types.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRegistry {
    types: IndexMap<&'static str, ComponentType>,
}

impl GeneratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in component type.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for component_type in components::builtin() {
            registry.register(component_type);
        }
        registry
    }

    /// Add or replace a component type.
    pub fn register(&mut self, component_type: ComponentType) {
        debug!(component_type = component_type.name, "Registering component type");
        self.types.insert(component_type.name, component_type);
    }

    /// Look up a type.
    pub fn get(&self, name: &str) -> Option<&ComponentType> {
        self.types.get(name)
    }

    /// Look up a type that generator metadata refers to.
    pub fn require(&self, name: &str) -> Result<&ComponentType> {
        self.get(name)
            .ok_or_else(|| LogicError::UnknownComponentType(name.to_string()).into())
    }

    /// Every registered type in registration order.
    pub fn types(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.values()
    }

    /// Type names.
    pub fn names(&self) -> Vec<&'static str> {
        self.types.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_types::GenerationError;

    #[test]
    fn test_standard_registry() {
        let registry = GeneratorRegistry::standard();
        for name in ["module", "profile", "test_module", "service", "plugin", "hook_update_n"] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
        assert!(registry.get("module").unwrap().root);
        assert!(!registry.get("service").unwrap().root);
    }

    #[test]
    fn test_unknown_type_is_logic_error() {
        let registry = GeneratorRegistry::standard();
        let err = registry.require("nope").unwrap_err();
        assert!(matches!(err, GenerationError::Logic(LogicError::UnknownComponentType(_))));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_every_type_references_registered_types() {
        let registry = GeneratorRegistry::standard();
        for component_type in registry.types() {
            for property in component_type.definition().properties.values() {
                if let Some(target) = &property.component_type {
                    assert!(registry.get(target).is_some(), "{} -> {}", component_type.name, target);
                }
            }
        }
    }
}
