//! Property definitions shared by several component types.

use hookwright_core::util::{pascal_case, readable_name};
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_types::{MachineName, MetadataSource};
use indexmap::IndexMap;
use serde_json::{json, Value};

/// Implements the data accessors of [`crate::Generator`] for a struct with a
/// `data: DataItem` field.
macro_rules! generator_data {
    ($component_type:literal) => {
        fn component_type(&self) -> &str {
            $component_type
        }

        fn data(&self) -> &hookwright_data::DataItem {
            &self.data
        }

        fn data_mut(&mut self) -> &mut hookwright_data::DataItem {
            &mut self.data
        }
    };
}
pub(crate) use generator_data;

/// Validator for machine names.
pub fn machine_name_validator(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(name) if MachineName::is_valid(name) => Ok(()),
        Some(name) => Err(format!(
            "'{}' must start with a lowercase letter and contain only lowercase letters, digits, and underscores",
            name
        )),
        None => Err("expected a string".to_string()),
    }
}

/// The machine name of a root component.
pub fn root_name() -> PropertyDefinition {
    PropertyDefinition::string("root_name")
        .label("Machine name")
        .required()
        .validator(machine_name_validator)
}

/// Human-readable name, defaulting from the machine name.
pub fn readable_name_from(source: &'static str) -> PropertyDefinition {
    PropertyDefinition::string("readable_name")
        .label("Name")
        .default_fn(move |ctx| Ok(json!(readable_name(&ctx.get_str(source)?))))
}

/// Machine name of the nearest root, taken from the requester.
pub fn root_component_name() -> PropertyDefinition {
    PropertyDefinition::string("root_component_name").acquired()
}

/// Label of the nearest root, taken from the requester.
pub fn root_readable_name() -> PropertyDefinition {
    PropertyDefinition::string("readable_name").acquired()
}

/// Short class name, defaulting from another property.
pub fn class_name_from(source: &'static str) -> PropertyDefinition {
    PropertyDefinition::string("class_name")
        .label("Class name")
        .default_fn(move |ctx| Ok(json!(pascal_case(&ctx.get_str(source)?))))
        .validator(|value| match value.as_str() {
            Some(name) if is_class_name(name) => Ok(()),
            _ => Err(format!("{} is not a valid PHP class name", value)),
        })
}

/// Services the component's class has injected.
pub fn injected_services() -> PropertyDefinition {
    PropertyDefinition::array("injected_services")
        .label("Injected services")
        .options_fn(service_options)
}

/// Service ids from metadata.
pub fn service_options(metadata: &dyn MetadataSource) -> IndexMap<String, String> {
    metadata
        .services()
        .into_iter()
        .map(|s| (s.id.clone(), if s.description.is_empty() { s.id.clone() } else { s.description.clone() }))
        .collect()
}

fn is_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// User-supplied data of a child property, leaving out values filled in by
/// defaults in this component's context.
pub fn explicit(data: &DataItem, name: &str) -> Value {
    data.get(name).map(DataItem::export_explicit).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_class_name_default_and_validation() {
        let def = Arc::new(PropertyDefinition::root(
            "service",
            vec![PropertyDefinition::string("service_name"), class_name_from("service_name")],
        ));
        let mut item = DataItem::new(def.clone());
        item.set(json!({"service_name": "alpha_beta"})).unwrap();
        item.apply_defaults().unwrap();
        assert_eq!(item.str_of("class_name"), Some("AlphaBeta"));

        let mut bad = DataItem::new(def);
        let err = bad.set(json!({"class_name": "not-a-class"})).unwrap_err();
        assert_eq!(err.path, "service/class_name");
    }

    #[test]
    fn test_machine_name_validator() {
        assert!(machine_name_validator(&json!("test_module")).is_ok());
        assert!(machine_name_validator(&json!("Test")).is_err());
        assert!(machine_name_validator(&json!(3)).is_err());
    }
}
