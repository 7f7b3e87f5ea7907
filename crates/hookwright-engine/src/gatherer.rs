//! Component data-definition gatherer.
//!
//! Composes a component type's full request schema: its own properties plus,
//! for every property that takes another component type's data, that type's
//! schema embedded recursively. Composed definitions are cached per type.

use hookwright_data::{PropertyDefinition, PropertySummary};
use hookwright_generators::GeneratorRegistry;
use hookwright_types::{MetadataSource, PropertyFormat, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds and caches composed component schemas.
#[derive(Debug)]
pub struct Gatherer {
    registry: Arc<GeneratorRegistry>,
    cache: RwLock<HashMap<String, Arc<PropertyDefinition>>>,
}

impl Gatherer {
    /// Create a gatherer over a registry.
    pub fn new(registry: Arc<GeneratorRegistry>) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The registry schemas are gathered from.
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Composed root definition of a component type.
    pub fn definition(&self, component_type: &str) -> Result<Arc<PropertyDefinition>> {
        if let Some(cached) = self.cache.read().get(component_type) {
            trace!(component_type, "Schema cache hit");
            return Ok(cached.clone());
        }

        let definition = Arc::new(self.compose(component_type, &mut Vec::new())?);
        debug!(
            component_type,
            properties = definition.properties.len(),
            "Gathered component schema"
        );
        self.cache
            .write()
            .insert(component_type.to_string(), definition.clone());
        Ok(definition)
    }

    /// UI-facing schema: hidden properties left out, options resolved from
    /// `metadata` when it is given.
    pub fn summary(
        &self,
        component_type: &str,
        metadata: Option<&dyn MetadataSource>,
    ) -> Result<IndexMap<String, PropertySummary>> {
        Ok(self.definition(component_type)?.summary(metadata, false).properties)
    }

    /// Number of cached schemas.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn compose(&self, component_type: &str, stack: &mut Vec<String>) -> Result<PropertyDefinition> {
        let registered = self.registry.require(component_type)?;
        stack.push(component_type.to_string());

        let mut properties = Vec::new();
        for mut property in (registered.schema)() {
            if let Some(nested_type) = property.component_type.clone() {
                if stack.contains(&nested_type) {
                    // Recursive schemas end in free-form data.
                    trace!(component_type, property = %property.name, "Breaking schema cycle");
                    property.format = PropertyFormat::Mapping;
                    property.properties.clear();
                } else {
                    let nested = self.compose(&nested_type, stack)?;
                    property.format = PropertyFormat::Complex;
                    property.properties = nested.properties;
                }
            }
            properties.push(property);
        }

        stack.pop();
        Ok(PropertyDefinition::root(registered.name, properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_generators::StaticMetadata;

    fn gatherer() -> Gatherer {
        Gatherer::new(Arc::new(GeneratorRegistry::standard()))
    }

    #[test]
    fn test_embeds_component_schemas() {
        let gatherer = gatherer();
        let module = gatherer.definition("module").unwrap();

        let services = &module.properties["services"];
        assert!(services.multiple);
        assert_eq!(services.format, PropertyFormat::Complex);
        assert!(services.properties.contains_key("service_name"));
        assert!(services.properties.contains_key("injected_services"));
    }

    #[test]
    fn test_recursive_schema_is_cut() {
        let gatherer = gatherer();
        let module = gatherer.definition("module").unwrap();

        let fixture_tests = &module.properties["test_modules"].properties["phpunit_tests"];
        let nested_fixtures = &fixture_tests.properties["test_modules"];
        assert_eq!(nested_fixtures.format, PropertyFormat::Mapping);
        assert!(nested_fixtures.properties.is_empty());
    }

    #[test]
    fn test_definitions_are_cached() {
        let gatherer = gatherer();
        let first = gatherer.definition("service").unwrap();
        let second = gatherer.definition("service").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gatherer.cached(), 1);
    }

    #[test]
    fn test_summary_hides_acquired_and_expands_options() {
        let gatherer = gatherer();
        let metadata = StaticMetadata::builtin().unwrap();

        let summary = gatherer.summary("service", Some(&metadata)).unwrap();
        assert!(!summary.contains_key("root_component_name"));
        let options = summary["injected_services"].options.as_ref().unwrap();
        assert!(options.contains_key("current_user"));

        let unexpanded = gatherer.summary("service", None).unwrap();
        assert!(unexpanded["injected_services"].options.is_none());
    }

    #[test]
    fn test_unknown_type() {
        assert!(gatherer().definition("nope").is_err());
    }
}
