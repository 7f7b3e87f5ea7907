//! The generator capability interface and its request/containment vocabulary.

use crate::build::BuildContext;
use hookwright_data::DataItem;
use hookwright_types::{GeneratorConfig, MetadataSource, Result};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fmt;

/// One resolved component occurrence.
///
/// The collector and containment builder depend only on this interface; the
/// concrete component types live in [`crate::components`].
pub trait Generator: Send + Sync + fmt::Debug {
    /// Component type name, e.g. `service`.
    fn component_type(&self) -> &str;

    /// The component's request data.
    fn data(&self) -> &DataItem;

    /// Mutable request data, used when another request merges into this one.
    fn data_mut(&mut self) -> &mut DataItem;

    /// Distinguishes occurrences of a repeatable type. `None` for singletons.
    fn discriminator(&self) -> Option<String> {
        None
    }

    /// Components this one needs, keyed by local request name.
    fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        Ok(IndexMap::new())
    }

    /// Where this component's output lives.
    fn containment(&self) -> ContainmentLocation {
        ContainmentLocation::nearest_root()
    }

    /// Occurrences with the same identifier and merge tag are one component.
    ///
    /// `None` means the component never merges.
    fn merge_tag(&self) -> Option<String> {
        Some(self.component_type().to_string())
    }

    /// Whether this component represents a file system root.
    fn is_root_component(&self) -> bool {
        false
    }

    /// Directory of a root component, relative to its container's root.
    fn root_directory(&self) -> String {
        String::new()
    }

    /// Contribute output to the shared build context.
    fn contribute(&self, _ctx: &mut BuildContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Read-only context handed to [`Generator::required_components`].
#[derive(Clone, Copy)]
pub struct RequirementContext<'a> {
    /// Metadata tables
    pub metadata: &'a dyn MetadataSource,
    /// Generator configuration
    pub config: &'a GeneratorConfig,
    /// Machine name of the nearest root component
    pub root_name: &'a str,
}

/// How a requirement's data is sliced into occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repeat {
    /// Exactly one occurrence carrying the data as-is
    Single,
    /// One occurrence per element of a scalar list; each element is placed
    /// under `key` in the occurrence's data
    Scalar {
        /// Property receiving the element
        key: String,
    },
    /// One occurrence per element of a list of records, or per entry of a
    /// map of records
    Record {
        /// Property receiving the map key, if the data is keyed
        key: Option<String>,
    },
    /// One occurrence if the data is `true`, none otherwise
    Flag,
}

/// A request for another component.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    /// Target component type
    pub component_type: String,
    /// Request data, shaped according to `repeat`
    pub data: Value,
    /// Repeat policy
    pub repeat: Repeat,
    /// Context merged into every occurrence's data; element data wins
    pub shared: Value,
}

impl Requirement {
    /// A single occurrence.
    pub fn single(component_type: impl Into<String>, data: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data,
            repeat: Repeat::Single,
            shared: json!({}),
        }
    }

    /// One occurrence per scalar in `values`.
    pub fn each_scalar(component_type: impl Into<String>, key: impl Into<String>, values: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data: values,
            repeat: Repeat::Scalar { key: key.into() },
            shared: json!({}),
        }
    }

    /// One occurrence per record in `records`.
    pub fn each_record(component_type: impl Into<String>, records: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data: records,
            repeat: Repeat::Record { key: None },
            shared: json!({}),
        }
    }

    /// One occurrence per entry of a keyed map of records.
    pub fn each_keyed(component_type: impl Into<String>, key: impl Into<String>, records: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data: records,
            repeat: Repeat::Record { key: Some(key.into()) },
            shared: json!({}),
        }
    }

    /// An occurrence only when `present` is true.
    pub fn flag(component_type: impl Into<String>, present: bool, data: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data: Value::Bool(present),
            repeat: Repeat::Flag,
            shared: data,
        }
    }

    /// Add shared context to every occurrence.
    pub fn with_shared(mut self, shared: Value) -> Self {
        self.shared = shared;
        self
    }

    /// Slice the request into `(local name suffix, data)` occurrences.
    ///
    /// The suffix is empty for single occurrences and the element index or
    /// key otherwise.
    pub fn occurrences(&self) -> Vec<(Option<String>, Value)> {
        let with_shared = |element: Value| hookwright_core::util::data::overlay(self.shared.clone(), element);

        match &self.repeat {
            Repeat::Single => vec![(None, with_shared(self.data.clone()))],
            Repeat::Flag => match self.data {
                Value::Bool(true) => vec![(None, self.shared.clone())],
                _ => Vec::new(),
            },
            Repeat::Scalar { key } => elements(&self.data)
                .into_iter()
                .map(|(index, element)| {
                    let mut data = serde_json::Map::new();
                    data.insert(key.clone(), element);
                    (Some(index), with_shared(Value::Object(data)))
                })
                .collect(),
            Repeat::Record { key } => elements(&self.data)
                .into_iter()
                .map(|(index, element)| {
                    let mut element = element;
                    if let (Some(key), Value::Object(map)) = (key, &mut element) {
                        map.entry(key.clone()).or_insert_with(|| Value::String(index.clone()));
                    }
                    (Some(index), with_shared(element))
                })
                .collect(),
        }
    }
}

fn elements(data: &Value) -> Vec<(String, Value)> {
    match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Null => Vec::new(),
        other => vec![("0".to_string(), other.clone())],
    }
}

/// One step of a containment expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainmentStep {
    /// The component that requested the current one
    Requester,
    /// The nearest root component above the current one in the request graph
    NearestRoot,
    /// The outermost root of the whole collection
    TopRoot,
    /// A component the current one requested under this local name
    Child(String),
}

/// Where a component's output belongs: a chain of steps evaluated from the
/// component itself. An empty chain marks the absolute root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainmentLocation(pub Vec<ContainmentStep>);

impl ContainmentLocation {
    /// No container.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The requester.
    pub fn requester() -> Self {
        Self(vec![ContainmentStep::Requester])
    }

    /// The nearest root component.
    pub fn nearest_root() -> Self {
        Self(vec![ContainmentStep::NearestRoot])
    }

    /// The outermost root.
    pub fn top_root() -> Self {
        Self(vec![ContainmentStep::TopRoot])
    }

    /// A component this one requested.
    pub fn child(name: impl Into<String>) -> Self {
        Self(vec![ContainmentStep::Child(name.into())])
    }

    /// Append a step.
    pub fn then(mut self, step: ContainmentStep) -> Self {
        self.0.push(step);
        self
    }

    /// Whether this marks the absolute root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContainmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        let steps: Vec<String> = self
            .0
            .iter()
            .map(|s| match s {
                ContainmentStep::Requester => "%requester".to_string(),
                ContainmentStep::NearestRoot => "%nearest_root".to_string(),
                ContainmentStep::TopRoot => "%root".to_string(),
                ContainmentStep::Child(name) => name.clone(),
            })
            .collect();
        f.write_str(&steps.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_slicing() {
        let req = Requirement::each_scalar("hook_update_n", "description", json!(["First", "Second"]))
            .with_shared(json!({"root_component_name": "test_module"}));
        let occurrences = req.occurrences();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[1].0.as_deref(), Some("1"));
        assert_eq!(
            occurrences[1].1,
            json!({"root_component_name": "test_module", "description": "Second"})
        );
    }

    #[test]
    fn test_record_slicing_keyed_and_listed() {
        let listed = Requirement::each_record("service", json!([{"service_name": "alpha"}]));
        assert_eq!(listed.occurrences()[0].1, json!({"service_name": "alpha"}));

        let keyed = Requirement::each_keyed("permission", "permission", json!({"administer alpha": {"title": "Admin"}}));
        let occurrences = keyed.occurrences();
        assert_eq!(occurrences[0].0.as_deref(), Some("administer alpha"));
        assert_eq!(occurrences[0].1, json!({"title": "Admin", "permission": "administer alpha"}));
    }

    #[test]
    fn test_flag_slicing() {
        assert_eq!(Requirement::flag("readme", false, json!({})).occurrences().len(), 0);
        let present = Requirement::flag("readme", true, json!({"a": 1})).occurrences();
        assert_eq!(present, vec![(None, json!({"a": 1}))]);
    }

    #[test]
    fn test_element_data_wins_over_shared() {
        let req = Requirement::each_record("service", json!([{"service_name": "alpha"}]))
            .with_shared(json!({"service_name": "ignored", "extra": true}));
        assert_eq!(req.occurrences()[0].1, json!({"service_name": "alpha", "extra": true}));
    }

    #[test]
    fn test_containment_display() {
        let location = ContainmentLocation::requester().then(ContainmentStep::Requester);
        assert_eq!(location.to_string(), "%requester:%requester");
        assert!(ContainmentLocation::root().is_root());
    }
}
