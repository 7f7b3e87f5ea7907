//! Property definitions: the declarative schema of a component's request data.

use crate::defaults::DefaultContext;
use hookwright_types::{MetadataSource, PropertyFormat, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A default computed from sibling values.
pub type DefaultFn = Arc<dyn Fn(&mut DefaultContext<'_>) -> Result<Value> + Send + Sync>;

/// Options computed from the metadata tables.
pub type OptionsFn = Arc<dyn Fn(&dyn MetadataSource) -> IndexMap<String, String> + Send + Sync>;

/// Extra validation run whenever a scalar value is set.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// Default value of a property.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value
    Literal(Value),
    /// A function of the item's siblings, evaluated once per item
    Computed(DefaultFn),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Enumerated options of a property.
#[derive(Clone)]
pub enum OptionsSource {
    /// Fixed list of value to label
    Static(IndexMap<String, String>),
    /// Computed from metadata on first use
    Computed(OptionsFn),
}

impl OptionsSource {
    /// Resolve to a concrete option list.
    pub fn resolve(&self, metadata: &dyn MetadataSource) -> IndexMap<String, String> {
        match self {
            OptionsSource::Static(options) => options.clone(),
            OptionsSource::Computed(f) => f(metadata),
        }
    }
}

impl fmt::Debug for OptionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsSource::Static(o) => f.debug_tuple("Static").field(o).finish(),
            OptionsSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Describes one field of a component's request schema.
///
/// Definitions are built with the chained constructors below:
///
/// ```
/// use hookwright_data::PropertyDefinition;
/// use serde_json::json;
///
/// let def = PropertyDefinition::complex("service")
///     .property(PropertyDefinition::string("service_name").required())
///     .property(PropertyDefinition::array("injected_services"))
///     .property(PropertyDefinition::boolean("lazy").default_value(json!(false)));
///
/// assert_eq!(def.properties.len(), 3);
/// assert!(def.properties["injected_services"].multiple);
/// ```
#[derive(Clone)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// UI label
    pub label: String,
    /// Longer help text
    pub description: Option<String>,
    /// Value format
    pub format: PropertyFormat,
    /// Unbounded ordered list of values
    pub multiple: bool,
    /// Must have a value once defaults are applied
    pub required: bool,
    /// Derived, never user-supplied
    pub computed: bool,
    /// Hidden from UIs but settable
    pub internal: bool,
    /// Filled from the requesting component's context
    pub acquired: bool,
    /// Default value
    pub default: Option<DefaultValue>,
    /// Enumerated options
    pub options: Option<OptionsSource>,
    /// Extra validators for scalar values
    pub validators: Vec<ValidatorFn>,
    /// Nested definitions for complex formats
    pub properties: IndexMap<String, Arc<PropertyDefinition>>,
    /// Component type whose schema this complex property takes
    pub component_type: Option<String>,
}

impl PropertyDefinition {
    /// Create a definition with every optional attribute at its default.
    pub fn new(name: impl Into<String>, format: PropertyFormat) -> Self {
        let name = name.into();
        Self {
            label: hookwright_core::util::readable_name(&name),
            name,
            description: None,
            multiple: format == PropertyFormat::Array,
            format,
            required: false,
            computed: false,
            internal: false,
            acquired: false,
            default: None,
            options: None,
            validators: Vec::new(),
            properties: IndexMap::new(),
            component_type: None,
        }
    }

    /// A single string.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyFormat::String)
    }

    /// A boolean flag.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, PropertyFormat::Boolean)
    }

    /// An ordered list of strings.
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, PropertyFormat::Array)
    }

    /// A nested record.
    pub fn complex(name: impl Into<String>) -> Self {
        Self::new(name, PropertyFormat::Complex)
    }

    /// Free-form keyed data.
    pub fn mapping(name: impl Into<String>) -> Self {
        Self::new(name, PropertyFormat::Mapping)
    }

    /// Root definition of a component type.
    pub fn root(component_type: &str, properties: Vec<PropertyDefinition>) -> Self {
        let mut def = Self::complex(component_type);
        def.component_type = Some(component_type.to_string());
        for property in properties {
            def.properties.insert(property.name.clone(), Arc::new(property));
        }
        def
    }

    /// Set the UI label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Make the property multi-valued.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Mark the property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the property as computed.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark the property as internal.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Mark the property as acquired from the requester.
    pub fn acquired(mut self) -> Self {
        self.acquired = true;
        self.internal = true;
        self
    }

    /// Set a literal default.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Literal(value));
        self
    }

    /// Set a default computed from sibling values.
    pub fn default_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut DefaultContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    /// Set static options.
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options = Some(OptionsSource::Static(
            options.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Set options computed from metadata.
    pub fn options_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn MetadataSource) -> IndexMap<String, String> + Send + Sync + 'static,
    {
        self.options = Some(OptionsSource::Computed(Arc::new(f)));
        self
    }

    /// Add a validator.
    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(f));
        self
    }

    /// Add a nested property.
    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.insert(property.name.clone(), Arc::new(property));
        self
    }

    /// Take the nested schema of another component type.
    pub fn component(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    /// Whether the property is hidden from UI-facing schema output.
    pub fn is_hidden(&self) -> bool {
        self.computed || self.internal || self.acquired
    }

    /// The same definition, single-valued. Used for list entries.
    pub fn as_single(&self) -> PropertyDefinition {
        let mut single = self.clone();
        single.multiple = false;
        if single.format == PropertyFormat::Array {
            single.format = PropertyFormat::String;
        }
        single
    }

    /// Serializable description, optionally including hidden properties.
    pub fn summary(&self, metadata: Option<&dyn MetadataSource>, include_hidden: bool) -> PropertySummary {
        let properties = self
            .properties
            .values()
            .filter(|p| include_hidden || !p.is_hidden())
            .map(|p| (p.name.clone(), p.summary(metadata, include_hidden)))
            .collect();

        let options = match (&self.options, metadata) {
            (Some(OptionsSource::Static(o)), _) => Some(o.clone()),
            (Some(source), Some(metadata)) => Some(source.resolve(metadata)),
            _ => None,
        };

        PropertySummary {
            name: self.name.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            format: self.format,
            multiple: self.multiple,
            required: self.required,
            default: match &self.default {
                Some(DefaultValue::Literal(v)) => Some(v.clone()),
                _ => None,
            },
            options,
            properties,
        }
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("multiple", &self.multiple)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("component_type", &self.component_type)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Serializable view of a property definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    /// Property name
    pub name: String,
    /// UI label
    pub label: String,
    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value format
    pub format: PropertyFormat,
    /// Multi-valued
    pub multiple: bool,
    /// Required
    pub required: bool,
    /// Literal default, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Options, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexMap<String, String>>,
    /// Nested properties
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertySummary>,
}
