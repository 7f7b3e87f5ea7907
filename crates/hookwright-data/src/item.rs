//! Data items: the runtime value tree mirroring a property definition tree.

use crate::defaults::DefaultContext;
use crate::definition::{OptionsSource, PropertyDefinition};
use hookwright_types::{DataLossError, InputError, MetadataSource, PropertyFormat, Result};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

/// A mutable, typed value container.
///
/// The shape of an item always matches its definition: single scalars hold a
/// scalar, multi-valued properties hold a list of single-valued items, complex
/// properties hold one child item per nested property.
///
/// ```
/// use hookwright_data::{DataItem, PropertyDefinition};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let def = PropertyDefinition::root("service", vec![
///     PropertyDefinition::string("service_name").required(),
///     PropertyDefinition::array("injected_services"),
/// ]);
/// let mut item = DataItem::new(Arc::new(def));
/// item.set(json!({"service_name": "alpha", "injected_services": ["current_user"]})).unwrap();
///
/// assert_eq!(item.str_of("service_name"), Some("alpha"));
/// assert_eq!(item.strings_of("injected_services"), vec!["current_user"]);
/// ```
#[derive(Clone, Debug)]
pub struct DataItem {
    definition: Arc<PropertyDefinition>,
    path: String,
    pub(crate) value: ItemValue,
    defaulted: bool,
    options_cache: OnceCell<IndexMap<String, String>>,
}

#[derive(Clone, Debug)]
pub(crate) enum ItemValue {
    Empty,
    Scalar(Value),
    List(Vec<DataItem>),
    Complex(IndexMap<String, DataItem>),
    Mapping(Value),
}

impl DataItem {
    /// Create an empty item for a definition.
    pub fn new(definition: Arc<PropertyDefinition>) -> Self {
        let path = definition.name.clone();
        Self::with_path(definition, path)
    }

    pub(crate) fn with_path(definition: Arc<PropertyDefinition>, path: String) -> Self {
        Self {
            definition,
            path,
            value: ItemValue::Empty,
            defaulted: false,
            options_cache: OnceCell::new(),
        }
    }

    /// The item's definition.
    pub fn definition(&self) -> &PropertyDefinition {
        &self.definition
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Slash-separated path from the root item.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn repath(&mut self, path: String) {
        match &mut self.value {
            ItemValue::List(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    item.repath(format!("{}/{}", path, index));
                }
            }
            ItemValue::Complex(children) => {
                for (name, child) in children.iter_mut() {
                    child.repath(format!("{}/{}", path, name));
                }
            }
            _ => {}
        }
        self.path = path;
    }

    /// Whether the item holds no data.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            ItemValue::Empty => true,
            ItemValue::Scalar(v) => v.is_null(),
            ItemValue::List(items) => items.is_empty(),
            ItemValue::Complex(children) => children.values().all(DataItem::is_empty),
            ItemValue::Mapping(v) => match v {
                Value::Null => true,
                Value::Object(m) => m.is_empty(),
                Value::Array(a) => a.is_empty(),
                _ => false,
            },
        }
    }

    pub(crate) fn needs_default(&self) -> bool {
        !self.defaulted && self.is_empty()
    }

    pub(crate) fn mark_defaulted(&mut self) {
        self.defaulted = true;
    }

    fn invalid(&self, reason: impl Into<String>) -> InputError {
        InputError::new(self.path.clone(), reason)
    }

    /// Replace the item's value, validating format, validators, and static options.
    pub fn set(&mut self, value: Value) -> std::result::Result<(), InputError> {
        if value.is_null() {
            self.value = ItemValue::Empty;
            return Ok(());
        }

        if self.definition.multiple {
            let values = match value {
                Value::Array(values) => values,
                other => vec![other],
            };
            let single = Arc::new(self.definition.as_single());
            let mut items = Vec::with_capacity(values.len());
            for (index, v) in values.into_iter().enumerate() {
                let mut item = DataItem::with_path(single.clone(), format!("{}/{}", self.path, index));
                item.set(v)?;
                items.push(item);
            }
            self.value = ItemValue::List(items);
            return Ok(());
        }

        self.value = match self.definition.format {
            PropertyFormat::String | PropertyFormat::Array => {
                let value = match value {
                    Value::String(s) => Value::String(s),
                    Value::Number(n) => Value::String(n.to_string()),
                    other => return Err(self.invalid(format!("expected a string, got {}", other))),
                };
                self.check_scalar(&value)?;
                ItemValue::Scalar(value)
            }
            PropertyFormat::Boolean => {
                let flag = match &value {
                    Value::Bool(b) => *b,
                    Value::Number(n) if n.as_u64() == Some(0) => false,
                    Value::Number(n) if n.as_u64() == Some(1) => true,
                    Value::String(s) if matches!(s.as_str(), "true" | "1" | "yes") => true,
                    Value::String(s) if matches!(s.as_str(), "false" | "0" | "no" | "") => false,
                    other => return Err(self.invalid(format!("expected a boolean, got {}", other))),
                };
                let value = Value::Bool(flag);
                self.check_scalar(&value)?;
                ItemValue::Scalar(value)
            }
            PropertyFormat::Complex => {
                let Value::Object(map) = value else {
                    return Err(self.invalid(format!("expected a record, got {}", value)));
                };
                let mut children = IndexMap::new();
                for (key, child_value) in map {
                    let Some(child_def) = self.definition.properties.get(&key) else {
                        return Err(self.invalid(format!("unknown property '{}'", key)));
                    };
                    if child_def.computed {
                        return Err(InputError::new(
                            format!("{}/{}", self.path, key),
                            "is derived and cannot be supplied",
                        ));
                    }
                    let mut child =
                        DataItem::with_path(child_def.clone(), format!("{}/{}", self.path, key));
                    child.set(child_value)?;
                    children.insert(key, child);
                }
                ItemValue::Complex(children)
            }
            PropertyFormat::Mapping => match value {
                Value::Object(_) | Value::Array(_) => ItemValue::Mapping(value),
                other => return Err(self.invalid(format!("expected keyed data, got {}", other))),
            },
        };
        Ok(())
    }

    fn check_scalar(&self, value: &Value) -> std::result::Result<(), InputError> {
        for validator in &self.definition.validators {
            validator(value).map_err(|reason| self.invalid(reason))?;
        }
        if let (Some(OptionsSource::Static(options)), Some(s)) = (&self.definition.options, value.as_str()) {
            check_option(options, s).map_err(|reason| self.invalid(reason))?;
        }
        Ok(())
    }

    /// Append a value to a multi-valued item.
    pub fn push(&mut self, value: Value) -> std::result::Result<(), InputError> {
        if !self.definition.multiple {
            return Err(self.invalid("cannot append to a single-valued property"));
        }
        let index = self.items().len();
        let mut item = DataItem::with_path(
            Arc::new(self.definition.as_single()),
            format!("{}/{}", self.path, index),
        );
        item.set(value)?;
        match &mut self.value {
            ItemValue::List(items) => items.push(item),
            _ => self.value = ItemValue::List(vec![item]),
        }
        Ok(())
    }

    /// A materialized child of a complex item.
    pub fn get(&self, name: &str) -> Option<&DataItem> {
        match &self.value {
            ItemValue::Complex(children) => children.get(name),
            _ => None,
        }
    }

    /// Mutable access to a child, creating it if it is not materialized yet.
    pub fn child(&mut self, name: &str) -> std::result::Result<&mut DataItem, InputError> {
        let Some(child_def) = self.definition.properties.get(name).cloned() else {
            return Err(self.invalid(format!("unknown property '{}'", name)));
        };
        if !matches!(self.value, ItemValue::Complex(_)) {
            self.value = ItemValue::Complex(IndexMap::new());
        }
        let path = format!("{}/{}", self.path, name);
        match &mut self.value {
            ItemValue::Complex(children) => Ok(children
                .entry(name.to_string())
                .or_insert_with(|| DataItem::with_path(child_def, path))),
            _ => Err(InputError::new(path, "not a record")),
        }
    }

    /// Set a child value by name.
    pub fn set_child(&mut self, name: &str, value: Value) -> std::result::Result<(), InputError> {
        self.child(name)?.set(value)
    }

    /// Entries of a multi-valued item.
    pub fn items(&self) -> &[DataItem] {
        match &self.value {
            ItemValue::List(items) => items,
            _ => &[],
        }
    }

    /// Plain value snapshot: objects, arrays, and scalars only.
    pub fn export(&self) -> Value {
        match &self.value {
            ItemValue::Empty => Value::Null,
            ItemValue::Scalar(v) | ItemValue::Mapping(v) => v.clone(),
            ItemValue::List(items) => Value::Array(items.iter().map(DataItem::export).collect()),
            ItemValue::Complex(children) => Value::Object(
                children
                    .iter()
                    .filter(|(_, c)| !c.is_empty())
                    .map(|(k, c)| (k.clone(), c.export()))
                    .collect(),
            ),
        }
    }

    /// Like [`DataItem::export`], but leaves out values filled in by defaults.
    pub fn export_explicit(&self) -> Value {
        if self.defaulted {
            return Value::Null;
        }
        match &self.value {
            ItemValue::List(items) => Value::Array(items.iter().map(DataItem::export_explicit).collect()),
            ItemValue::Complex(children) => Value::Object(
                children
                    .iter()
                    .filter(|(_, c)| !c.defaulted && !c.is_empty())
                    .map(|(k, c)| (k.clone(), c.export_explicit()))
                    .collect(),
            ),
            _ => self.export(),
        }
    }

    /// String value of a single scalar item.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ItemValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Flag value; false when unset.
    pub fn as_bool(&self) -> bool {
        matches!(&self.value, ItemValue::Scalar(Value::Bool(true)))
    }

    /// String values of a multi-valued scalar item, or the single value.
    pub fn strings(&self) -> Vec<String> {
        match &self.value {
            ItemValue::List(items) => items.iter().filter_map(|i| i.as_str().map(String::from)).collect(),
            ItemValue::Scalar(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// String value of a child.
    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// String value of a child, empty when unset.
    pub fn string_of(&self, name: &str) -> String {
        self.str_of(name).unwrap_or_default().to_string()
    }

    /// Flag value of a child.
    pub fn bool_of(&self, name: &str) -> bool {
        self.get(name).map_or(false, DataItem::as_bool)
    }

    /// String list of a child.
    pub fn strings_of(&self, name: &str) -> Vec<String> {
        self.get(name).map(DataItem::strings).unwrap_or_default()
    }

    /// Exported value of a child.
    pub fn value_of(&self, name: &str) -> Value {
        self.get(name).map(DataItem::export).unwrap_or(Value::Null)
    }

    /// Apply defaults throughout the tree.
    ///
    /// Every property of a complex item is materialized, then each default is
    /// evaluated once, in whatever order the default functions need.
    pub fn apply_defaults(&mut self) -> Result<()> {
        if self.definition.multiple {
            if let ItemValue::List(items) = &mut self.value {
                for item in items {
                    item.apply_defaults()?;
                }
            }
            return Ok(());
        }

        if self.definition.format != PropertyFormat::Complex {
            return Ok(());
        }

        if !matches!(self.value, ItemValue::Complex(_)) {
            self.value = ItemValue::Complex(IndexMap::new());
        }
        let DataItem {
            definition, path, value, ..
        } = self;
        let ItemValue::Complex(children) = value else {
            return Ok(());
        };

        for (name, child_def) in &definition.properties {
            if !children.contains_key(name) {
                let child = DataItem::with_path(child_def.clone(), format!("{}/{}", path, name));
                children.insert(name.clone(), child);
            }
        }

        let names: Vec<String> = children.keys().cloned().collect();
        let mut context = DefaultContext::new(children, path);
        for name in &names {
            context.ensure(name)?;
        }

        for child in children.values_mut() {
            child.apply_defaults()?;
        }
        Ok(())
    }

    /// Options for this item, resolved from metadata once.
    pub fn options(&self, metadata: &dyn MetadataSource) -> Option<&IndexMap<String, String>> {
        let source = self.definition.options.as_ref()?;
        Some(self.options_cache.get_or_init(|| source.resolve(metadata)))
    }

    /// Check required values and metadata-computed options.
    pub fn validate(&self, metadata: Option<&dyn MetadataSource>) -> std::result::Result<(), InputError> {
        if self.definition.required && self.is_empty() {
            return Err(self.invalid("a value is required"));
        }

        match &self.value {
            ItemValue::List(items) => {
                let options = match (&self.definition.options, metadata) {
                    (Some(OptionsSource::Computed(_)), Some(md)) => self.options(md),
                    _ => None,
                };
                for item in items {
                    if let (Some(options), Some(s)) = (options, item.as_str()) {
                        check_option(options, s).map_err(|reason| item.invalid(reason))?;
                    }
                    item.validate(metadata)?;
                }
            }
            ItemValue::Complex(children) => {
                for child in children.values() {
                    child.validate(metadata)?;
                }
            }
            ItemValue::Scalar(Value::String(s)) => {
                if let (Some(OptionsSource::Computed(_)), Some(md)) = (&self.definition.options, metadata) {
                    if let Some(options) = self.options(md) {
                        check_option(options, s).map_err(|reason| self.invalid(reason))?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Merge another item of the same definition into this one.
    ///
    /// Returns whether anything changed. See [`crate::merge`] for the rules.
    pub fn merge(&mut self, other: &DataItem) -> std::result::Result<bool, DataLossError> {
        crate::merge::merge_items(self, other)
    }
}

impl PartialEq for DataItem {
    fn eq(&self, other: &Self) -> bool {
        self.definition.name == other.definition.name && self.export() == other.export()
    }
}

fn check_option(options: &IndexMap<String, String>, value: &str) -> std::result::Result<(), String> {
    if options.contains_key(value) {
        return Ok(());
    }
    let mut allowed: Vec<&str> = options.keys().map(String::as_str).take(10).collect();
    if options.len() > allowed.len() {
        allowed.push("...");
    }
    Err(format!(
        "'{}' is not one of the allowed options: {}",
        value,
        allowed.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_types::{GenerationError, LogicError};
    use serde_json::json;

    fn module_definition() -> Arc<PropertyDefinition> {
        Arc::new(PropertyDefinition::root(
            "module",
            vec![
                PropertyDefinition::string("root_name").required(),
                PropertyDefinition::string("readable_name").default_fn(|ctx| {
                    let name = ctx.get_str("root_name")?;
                    Ok(json!(hookwright_core::util::readable_name(&name)))
                }),
                PropertyDefinition::string("summary").default_fn(|ctx| {
                    let label = ctx.get_str("readable_name")?;
                    Ok(json!(format!("Provides {}.", label)))
                }),
                PropertyDefinition::array("hooks"),
                PropertyDefinition::boolean("readme").default_value(json!(true)),
                PropertyDefinition::complex("services")
                    .multiple()
                    .property(PropertyDefinition::string("service_name").required())
                    .property(PropertyDefinition::array("injected_services")),
                PropertyDefinition::string("lifecycle").options([("alpha", "Alpha"), ("stable", "Stable")]),
            ],
        ))
    }

    #[test]
    fn test_computed_property_cannot_be_supplied() {
        let definition = Arc::new(PropertyDefinition::root(
            "config_entity_type",
            vec![
                PropertyDefinition::string("entity_type_id").required(),
                PropertyDefinition::string("class_name")
                    .computed()
                    .default_fn(|ctx| Ok(json!(format!("{}Entity", ctx.get_str("entity_type_id")?)))),
            ],
        ));

        let mut item = DataItem::new(definition.clone());
        let err = item
            .set(json!({"entity_type_id": "robot", "class_name": "UserSupplied"}))
            .unwrap_err();
        assert_eq!(err.path, "config_entity_type/class_name");

        let mut item = DataItem::new(definition);
        item.set(json!({"entity_type_id": "robot"})).unwrap();
        item.apply_defaults().unwrap();
        assert_eq!(item.str_of("class_name"), Some("robotEntity"));
    }

    #[test]
    fn test_set_and_export() {
        let mut item = DataItem::new(module_definition());
        item.set(json!({
            "root_name": "test_module",
            "hooks": ["hook_help", "hook_install"],
            "services": [{"service_name": "alpha", "injected_services": ["current_user"]}],
        }))
        .unwrap();

        assert_eq!(item.str_of("root_name"), Some("test_module"));
        assert_eq!(item.strings_of("hooks"), vec!["hook_help", "hook_install"]);
        let services = item.get("services").unwrap();
        assert_eq!(services.items().len(), 1);
        assert_eq!(services.items()[0].path(), "module/services/0");
        assert_eq!(
            item.export(),
            json!({
                "root_name": "test_module",
                "hooks": ["hook_help", "hook_install"],
                "services": [{"service_name": "alpha", "injected_services": ["current_user"]}],
            })
        );
    }

    #[test]
    fn test_defaults_resolve_in_dependency_order() {
        let mut item = DataItem::new(module_definition());
        item.set(json!({"root_name": "test_module"})).unwrap();
        item.apply_defaults().unwrap();

        // "summary" is declared after "readable_name" but depends on it; either
        // order must work.
        assert_eq!(item.str_of("readable_name"), Some("Test module"));
        assert_eq!(item.str_of("summary"), Some("Provides Test module."));
        assert!(item.bool_of("readme"));
    }

    #[test]
    fn test_user_value_beats_default() {
        let mut item = DataItem::new(module_definition());
        item.set(json!({"root_name": "test_module", "readable_name": "Custom"})).unwrap();
        item.apply_defaults().unwrap();
        assert_eq!(item.str_of("readable_name"), Some("Custom"));
        assert_eq!(item.str_of("summary"), Some("Provides Custom."));

        let explicit = item.export_explicit();
        assert_eq!(explicit, json!({"root_name": "test_module", "readable_name": "Custom"}));
    }

    #[test]
    fn test_default_cycle_is_logic_error() {
        let def = Arc::new(PropertyDefinition::root(
            "cyclic",
            vec![
                PropertyDefinition::string("a").default_fn(|ctx| ctx.get("b")),
                PropertyDefinition::string("b").default_fn(|ctx| ctx.get("a")),
            ],
        ));
        let mut item = DataItem::new(def);
        let err = item.apply_defaults().unwrap_err();
        assert!(matches!(err, GenerationError::Logic(LogicError::DefaultCycle(_))));
    }

    #[test]
    fn test_invalid_input_names_the_path() {
        let mut item = DataItem::new(module_definition());
        let err = item
            .set(json!({"root_name": "x", "services": [{"service_name": ["nope"]}]}))
            .unwrap_err();
        assert_eq!(err.path, "module/services/0/service_name");

        let err = item.set(json!({"unknown": 1})).unwrap_err();
        assert!(err.reason.contains("unknown property"));

        let err = item.set(json!({"lifecycle": "beta"})).unwrap_err();
        assert_eq!(err.path, "module/lifecycle");
    }

    #[test]
    fn test_required_validation() {
        let mut item = DataItem::new(module_definition());
        item.set(json!({"hooks": ["hook_help"]})).unwrap();
        item.apply_defaults().unwrap();
        let err = item.validate(None).unwrap_err();
        assert_eq!(err.path, "module/root_name");
    }

    #[test]
    fn test_child_auto_creates() {
        let mut item = DataItem::new(module_definition());
        item.child("hooks").unwrap().push(json!("hook_help")).unwrap();
        item.child("hooks").unwrap().push(json!("hook_cron")).unwrap();
        assert_eq!(item.strings_of("hooks"), vec!["hook_help", "hook_cron"]);
        assert!(item.child("bogus").is_err());
    }
}
