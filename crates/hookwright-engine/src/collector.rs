//! Request graph resolution.
//!
//! Starting from one root request, the collector instantiates every component
//! transitively required, breadth first. Requests that resolve to an
//! identifier already in the collection are merged into the existing
//! component instead of creating a second one.

use crate::collection::{ComponentCollection, RequestEdge};
use crate::gatherer::Gatherer;
use hookwright_data::DataItem;
use hookwright_generators::{ComponentType, Generator, Requirement, RequirementContext};
use hookwright_types::{
    ComponentId, GenerationError, GeneratorConfig, InputError, LogicError, MetadataSource, Result,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::VecDeque;
use tracing::{debug, info, trace};

const ROOT_COMPONENT_NAME: &str = "root_component_name";

/// A request waiting to be resolved.
#[derive(Debug)]
struct Pending {
    requester: ComponentId,
    local_name: String,
    component_type: String,
    data: Value,
}

/// A freshly built generator with the request data it was built from.
struct Candidate {
    generator: Box<dyn Generator>,
    /// Request data before defaults were applied
    request: DataItem,
}

/// Resolves a root request into a [`ComponentCollection`].
pub struct Collector<'a> {
    gatherer: &'a Gatherer,
    metadata: &'a dyn MetadataSource,
    config: &'a GeneratorConfig,
}

impl<'a> Collector<'a> {
    /// Create a collector.
    pub fn new(gatherer: &'a Gatherer, metadata: &'a dyn MetadataSource, config: &'a GeneratorConfig) -> Self {
        Self {
            gatherer,
            metadata,
            config,
        }
    }

    /// Resolve `data` for a top-level `component_type` to a fixed point.
    pub fn collect(&self, component_type: &str, data: Value) -> Result<ComponentCollection> {
        let registered = self.gatherer.registry().require(component_type)?;
        if !registered.root {
            return Err(InputError::new(
                component_type,
                format!("'{}' cannot be requested on its own", component_type),
            )
            .into());
        }

        let candidate = self.instantiate(registered, data, None)?;
        let root_name = candidate.generator.data().string_of("root_name");
        let id = ComponentId::new(component_type, &root_name, candidate.generator.discriminator().as_deref());
        info!(root = %id, "Collecting components");

        let requirements = candidate.generator.required_components(&self.context(&root_name))?;
        let mut collection = ComponentCollection::new();
        collection.add_component(id.clone(), candidate.generator, root_name, None)?;

        let mut queue = VecDeque::new();
        enqueue(&mut queue, &id, requirements);
        while let Some(pending) = queue.pop_front() {
            self.resolve(&mut collection, pending, &mut queue)?;
        }

        info!(components = collection.len(), "Collected components");
        Ok(collection)
    }

    fn context<'c>(&'c self, root_name: &'c str) -> RequirementContext<'c> {
        RequirementContext {
            metadata: self.metadata,
            config: self.config,
            root_name,
        }
    }

    fn resolve(
        &self,
        collection: &mut ComponentCollection,
        pending: Pending,
        queue: &mut VecDeque<Pending>,
    ) -> Result<()> {
        let registered = self.gatherer.registry().require(&pending.component_type)?;
        let requester_root = collection.root_name(&pending.requester)?.to_string();
        let candidate = {
            let requester = collection.get(&pending.requester)?;
            self.instantiate(registered, pending.data, Some((requester, &requester_root)))?
        };

        let root_name = if candidate.generator.is_root_component() {
            candidate.generator.data().string_of("root_name")
        } else {
            requester_root
        };
        let id = ComponentId::new(
            registered.name,
            &root_name,
            candidate.generator.discriminator().as_deref(),
        );
        let edge = RequestEdge {
            requester: pending.requester,
            local_name: pending.local_name,
        };

        if collection.contains(&id) {
            let changed = self.merge(collection, &id, candidate, &edge)?;
            collection.add_request(&id, edge)?;
            if changed {
                // Merged data may ask for more; known children merge back unchanged.
                let root_name = collection.root_name(&id)?.to_string();
                let requirements = collection.get(&id)?.required_components(&self.context(&root_name))?;
                debug!(id = %id, "Re-resolving requirements of merged component");
                enqueue(queue, &id, requirements);
            }
            return Ok(());
        }

        let requirements = candidate.generator.required_components(&self.context(&root_name))?;
        collection.add_component(id.clone(), candidate.generator, root_name, Some(edge))?;
        let path = collection.request_path(&id)?;
        debug!(id = %id, path, "Instantiated component");
        enqueue(queue, &id, requirements);
        Ok(())
    }

    /// Build a generator from request data.
    ///
    /// Acquired properties are filled from the requester before defaults run,
    /// so defaults may depend on them.
    fn instantiate(
        &self,
        registered: &ComponentType,
        data: Value,
        requester: Option<(&dyn Generator, &str)>,
    ) -> Result<Candidate> {
        let definition = self.gatherer.definition(registered.name)?;
        let mut request = DataItem::new(definition.clone());
        request.set(data)?;

        if let Some((requester, requester_root)) = requester {
            for property in definition.properties.values().filter(|p| p.acquired) {
                if request.get(&property.name).map_or(false, |item| !item.is_empty()) {
                    continue;
                }
                let value = if property.name == ROOT_COMPONENT_NAME {
                    json!(requester_root)
                } else {
                    requester.data().value_of(&property.name)
                };
                if !value.is_null() {
                    trace!(component_type = registered.name, property = %property.name, "Acquired value");
                    request.set_child(&property.name, value)?;
                }
            }
        }

        let generator = self.build(registered, request.clone())?;
        Ok(Candidate { generator, request })
    }

    fn build(&self, registered: &ComponentType, mut data: DataItem) -> Result<Box<dyn Generator>> {
        data.apply_defaults()?;
        data.validate(Some(self.metadata))?;
        Ok((registered.factory)(data))
    }

    /// Fold a repeated request into the component already collected.
    ///
    /// Returns whether the component's data changed.
    fn merge(
        &self,
        collection: &mut ComponentCollection,
        id: &ComponentId,
        candidate: Candidate,
        edge: &RequestEdge,
    ) -> Result<bool> {
        let existing = collection.get(id)?;
        let duplicate = |reason: String| -> Result<GenerationError> {
            Ok(LogicError::DuplicateId {
                id: id.to_string(),
                existing_path: collection.request_path(id)?.to_string(),
                new_path: format!("{}/{}", collection.request_path(&edge.requester)?, edge.local_name),
                reason,
            }
            .into())
        };

        match (existing.merge_tag(), candidate.generator.merge_tag()) {
            (Some(mine), Some(theirs)) if mine == theirs => {}
            (mine, theirs) => {
                return Err(duplicate(format!(
                    "merge tags {} and {} differ",
                    mine.as_deref().unwrap_or("<none>"),
                    theirs.as_deref().unwrap_or("<none>")
                ))?)
            }
        }

        let mut merged = DataItem::new(self.gatherer.definition(id.component_type())?);
        merged.set(existing.data().export_explicit())?;
        let changed = match merged.merge(&candidate.request) {
            Ok(changed) => changed,
            Err(loss) => return Err(duplicate(loss.to_string())?),
        };

        debug!(id = %id, changed, "Merged repeated request");
        if changed {
            merged.apply_defaults()?;
            merged.validate(Some(self.metadata))?;
            *collection.get_mut(id)?.data_mut() = merged;
        }
        Ok(changed)
    }
}

fn enqueue(queue: &mut VecDeque<Pending>, requester: &ComponentId, requirements: IndexMap<String, Requirement>) {
    for (name, requirement) in requirements {
        for (suffix, data) in requirement.occurrences() {
            let local_name = match suffix {
                Some(suffix) => format!("{}/{}", name, suffix),
                None => name.clone(),
            };
            queue.push_back(Pending {
                requester: requester.clone(),
                local_name,
                component_type: requirement.component_type.clone(),
                data,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_data::PropertyDefinition;
    use hookwright_generators::{GeneratorRegistry, StaticMetadata};
    use std::sync::Arc;

    /// A component named by `name` that requires `next` of type `next_type`.
    #[derive(Debug)]
    struct Link {
        data: DataItem,
        component_type: &'static str,
        next: Option<&'static str>,
        merge_tag: Option<String>,
    }

    impl Generator for Link {
        fn component_type(&self) -> &str {
            self.component_type
        }
        fn data(&self) -> &DataItem {
            &self.data
        }
        fn data_mut(&mut self) -> &mut DataItem {
            &mut self.data
        }
        fn discriminator(&self) -> Option<String> {
            self.data.str_of("name").map(str::to_string)
        }
        fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
            let mut requirements = IndexMap::new();
            if let Some(next) = self.next {
                requirements.insert(
                    "next".to_string(),
                    Requirement::each_record(next, json!([{"name": "one", "tags": ["a"]}, {"name": "two"}])),
                );
            }
            Ok(requirements)
        }
        fn merge_tag(&self) -> Option<String> {
            self.merge_tag.clone()
        }
        fn is_root_component(&self) -> bool {
            self.component_type == "top"
        }
    }

    fn schema() -> Vec<PropertyDefinition> {
        vec![
            PropertyDefinition::string("root_name"),
            PropertyDefinition::string("root_component_name").acquired(),
            PropertyDefinition::string("name"),
            PropertyDefinition::array("tags"),
            PropertyDefinition::string("label").default_fn(|ctx| {
                Ok(json!(format!("{} in {}", ctx.get_str("name")?, ctx.get_str("root_component_name")?)))
            }),
        ]
    }

    fn link(data: DataItem, component_type: &'static str, next: Option<&'static str>) -> Box<dyn Generator> {
        Box::new(Link {
            data,
            component_type,
            next,
            merge_tag: Some(component_type.to_string()),
        })
    }

    fn top(data: DataItem) -> Box<dyn Generator> {
        link(data, "top", Some("middle"))
    }
    fn middle(data: DataItem) -> Box<dyn Generator> {
        link(data, "middle", Some("bottom"))
    }
    fn bottom(data: DataItem) -> Box<dyn Generator> {
        link(data, "bottom", Some("leaf"))
    }
    fn leaf(data: DataItem) -> Box<dyn Generator> {
        link(data, "leaf", None)
    }
    fn lone(data: DataItem) -> Box<dyn Generator> {
        link(data, "lone", None)
    }

    /// Requires one leaf per tag.
    #[derive(Debug)]
    struct Fan {
        data: DataItem,
    }

    impl Generator for Fan {
        fn component_type(&self) -> &str {
            "fan"
        }
        fn data(&self) -> &DataItem {
            &self.data
        }
        fn data_mut(&mut self) -> &mut DataItem {
            &mut self.data
        }
        fn discriminator(&self) -> Option<String> {
            self.data.str_of("name").map(str::to_string)
        }
        fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
            let mut requirements = IndexMap::new();
            requirements.insert(
                "tags".to_string(),
                Requirement::each_scalar("leaf", "name", self.data.value_of("tags")),
            );
            Ok(requirements)
        }
        fn merge_tag(&self) -> Option<String> {
            Some("fan".to_string())
        }
    }

    fn fan(data: DataItem) -> Box<dyn Generator> {
        Box::new(Fan { data })
    }

    /// Requests the same fan twice with different tags.
    #[derive(Debug)]
    struct Pair {
        data: DataItem,
    }

    impl Generator for Pair {
        fn component_type(&self) -> &str {
            "pair"
        }
        fn data(&self) -> &DataItem {
            &self.data
        }
        fn data_mut(&mut self) -> &mut DataItem {
            &mut self.data
        }
        fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
            let mut requirements = IndexMap::new();
            requirements.insert(
                "first".to_string(),
                Requirement::single("fan", json!({"name": "hub", "tags": ["a"]})),
            );
            requirements.insert(
                "second".to_string(),
                Requirement::single("fan", json!({"name": "hub", "tags": ["b"]})),
            );
            Ok(requirements)
        }
        fn is_root_component(&self) -> bool {
            true
        }
    }

    fn pair(data: DataItem) -> Box<dyn Generator> {
        Box::new(Pair { data })
    }

    fn registry() -> GeneratorRegistry {
        let mut registry = GeneratorRegistry::new();
        for (name, factory, root) in [
            ("top", top as fn(DataItem) -> Box<dyn Generator>, true),
            ("middle", middle, false),
            ("bottom", bottom, false),
            ("leaf", leaf, false),
            ("lone", lone, true),
            ("fan", fan, false),
            ("pair", pair, true),
        ] {
            registry.register(ComponentType {
                name,
                description: "",
                schema,
                factory,
                root,
            });
        }
        registry
    }

    #[test]
    fn test_root_without_requirements() {
        let gatherer = Gatherer::new(Arc::new(registry()));
        let metadata = StaticMetadata::default();
        let config = GeneratorConfig::default();
        let collection = Collector::new(&gatherer, &metadata, &config)
            .collect("lone", json!({"root_name": "solo"}))
            .unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.root_id().unwrap().as_str(), "lone:solo");
    }

    #[test]
    fn test_transitive_closure_three_levels_deep() {
        let gatherer = Gatherer::new(Arc::new(registry()));
        let metadata = StaticMetadata::default();
        let config = GeneratorConfig::default();
        let collection = Collector::new(&gatherer, &metadata, &config)
            .collect("top", json!({"root_name": "test_module"}))
            .unwrap();

        // Each of "one" and "two" is requested twice per level below the
        // first, and collapses to one component per type.
        let ids: Vec<&str> = collection.ids().map(ComponentId::as_str).collect();
        assert_eq!(
            ids,
            vec![
                "top:test_module",
                "middle:test_module:one",
                "middle:test_module:two",
                "bottom:test_module:one",
                "bottom:test_module:two",
                "leaf:test_module:one",
                "leaf:test_module:two",
            ]
        );

        let leaf = collection.get(&ComponentId::from("leaf:test_module:one")).unwrap();
        assert_eq!(leaf.data().str_of("root_component_name"), Some("test_module"));
        assert_eq!(leaf.data().str_of("label"), Some("one in test_module"));
        assert_eq!(
            collection.request_path(&ComponentId::from("leaf:test_module:one")).unwrap(),
            "top/next/0/next/0/next/0"
        );
    }

    #[test]
    fn test_merged_request_resolves_new_requirements() {
        let gatherer = Gatherer::new(Arc::new(registry()));
        let metadata = StaticMetadata::default();
        let config = GeneratorConfig::default();
        let collection = Collector::new(&gatherer, &metadata, &config)
            .collect("pair", json!({"root_name": "test_module"}))
            .unwrap();

        let ids: Vec<&str> = collection.ids().map(ComponentId::as_str).collect();
        assert_eq!(
            ids,
            vec![
                "pair:test_module",
                "fan:test_module:hub",
                "leaf:test_module:a",
                "leaf:test_module:b",
            ]
        );
        let hub = collection.get(&ComponentId::from("fan:test_module:hub")).unwrap();
        assert_eq!(hub.data().strings_of("tags"), vec!["a", "b"]);
    }

    #[test]
    fn test_non_root_type_cannot_be_requested_alone() {
        let gatherer = Gatherer::new(Arc::new(registry()));
        let metadata = StaticMetadata::default();
        let config = GeneratorConfig::default();
        let err = Collector::new(&gatherer, &metadata, &config)
            .collect("leaf", json!({"name": "x"}))
            .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_invalid_request_is_input_error() {
        let gatherer = Gatherer::new(Arc::new(registry()));
        let metadata = StaticMetadata::default();
        let config = GeneratorConfig::default();
        let err = Collector::new(&gatherer, &metadata, &config)
            .collect("lone", json!({"root_name": "solo", "bogus": true}))
            .unwrap_err();
        match err {
            GenerationError::Input(input) => assert_eq!(input.path, "lone"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
