//! Root components and the files every extension has.

use super::hooks::hook_options;
use crate::build::BuildContext;
use crate::generator::{ContainmentLocation, Generator, Requirement, RequirementContext};
use crate::properties::{self, explicit, generator_data, root_component_name, root_name};
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_types::Result;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

fn identity_properties(default_package: &'static str) -> Vec<PropertyDefinition> {
    vec![
        root_name(),
        properties::readable_name_from("root_name"),
        PropertyDefinition::string("short_description")
            .label("Description")
            .default_fn(|ctx| Ok(json!(format!("Provides {}.", ctx.get_str("readable_name")?)))),
        PropertyDefinition::string("package").default_value(json!(default_package)),
        PropertyDefinition::array("dependencies")
            .label("Dependencies")
            .description("Extensions this one needs, e.g. 'drupal:node'."),
        PropertyDefinition::string("lifecycle").options([
            ("experimental", "Experimental"),
            ("stable", "Stable"),
            ("deprecated", "Deprecated"),
            ("obsolete", "Obsolete"),
        ]),
    ]
}

fn feature_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::array("hooks")
            .label("Hook implementations")
            .options_fn(hook_options),
        PropertyDefinition::array("update_functions")
            .label("Update functions")
            .description("One numbered update per entry, summarised by the entry."),
        PropertyDefinition::complex("services").multiple().component("service"),
        PropertyDefinition::complex("plugins").multiple().component("plugin"),
        PropertyDefinition::complex("routes").multiple().component("route"),
        PropertyDefinition::complex("permissions").multiple().component("permission"),
        PropertyDefinition::complex("config_entity_types")
            .multiple()
            .component("config_entity_type"),
        PropertyDefinition::complex("phpunit_tests").multiple().component("phpunit_test"),
        PropertyDefinition::complex("libraries").multiple().component("library"),
        PropertyDefinition::boolean("readme")
            .label("README file")
            .default_value(json!(false)),
    ]
}

/// Requirements common to every root: one per requested feature.
fn feature_requirements(data: &DataItem, requirements: &mut IndexMap<String, Requirement>) {
    let hooks = explicit(data, "hooks");
    if !hooks.is_null() {
        requirements.insert("hooks".to_string(), Requirement::single("hooks", json!({ "hooks": hooks })));
    }

    requirements.insert(
        "update_functions".to_string(),
        Requirement::each_scalar("hook_update_n", "description", explicit(data, "update_functions")),
    );

    for (property, component_type) in [
        ("services", "service"),
        ("plugins", "plugin"),
        ("routes", "route"),
        ("permissions", "permission"),
        ("config_entity_types", "config_entity_type"),
        ("phpunit_tests", "phpunit_test"),
        ("libraries", "library"),
        ("test_modules", "test_module"),
    ] {
        if data.get(property).is_some() {
            requirements.insert(
                property.to_string(),
                Requirement::each_record(component_type, explicit(data, property)),
            );
        }
    }

    requirements.insert(
        "readme".to_string(),
        Requirement::flag("readme", data.bool_of("readme"), json!({})),
    );
}

/// A module or installation profile.
#[derive(Debug)]
pub struct Module {
    data: DataItem,
    extension_type: &'static str,
}

impl Module {
    /// Module properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        let mut properties = identity_properties("Custom");
        properties.extend(feature_properties());
        properties.push(PropertyDefinition::complex("test_modules").multiple().component("test_module"));
        properties
    }

    /// Profile properties.
    pub fn profile_properties() -> Vec<PropertyDefinition> {
        let mut properties = identity_properties("");
        properties.push(
            PropertyDefinition::array("install")
                .label("Modules to install")
                .description("Modules enabled when the profile is installed."),
        );
        properties.extend(feature_properties());
        properties
    }

    /// Module factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self {
            data,
            extension_type: "module",
        })
    }

    /// Profile factory.
    pub fn create_profile(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self {
            data,
            extension_type: "profile",
        })
    }
}

impl Generator for Module {
    fn component_type(&self) -> &str {
        self.extension_type
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
            "info".to_string(),
            Requirement::single("info_file", json!({ "extension_type": self.extension_type })),
        );
        feature_requirements(&self.data, &mut requirements);
        Ok(requirements)
    }

    fn containment(&self) -> ContainmentLocation {
        ContainmentLocation::root()
    }

    fn is_root_component(&self) -> bool {
        true
    }
}

/// A test fixture module living inside its parent's `tests/modules`.
#[derive(Debug)]
pub struct TestModule {
    data: DataItem,
}

impl TestModule {
    /// Test module properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        let mut properties = identity_properties("Testing");
        properties.push(root_component_name());
        properties.extend(feature_properties());
        properties
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for TestModule {
    generator_data!("test_module");

    fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let mut requirements = IndexMap::new();
        requirements.insert(
            "info".to_string(),
            Requirement::single("info_file", json!({ "extension_type": "module" })),
        );
        feature_requirements(&self.data, &mut requirements);
        Ok(requirements)
    }

    fn is_root_component(&self) -> bool {
        true
    }

    fn root_directory(&self) -> String {
        format!("tests/modules/{}", self.data.string_of("root_name"))
    }
}

/// The `.info.yml` file.
#[derive(Debug)]
pub struct InfoFile {
    data: DataItem,
}

impl InfoFile {
    /// Info file properties, all taken from the requesting root.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("readable_name").acquired(),
            PropertyDefinition::string("short_description").acquired(),
            PropertyDefinition::string("package").acquired(),
            PropertyDefinition::array("dependencies").acquired(),
            PropertyDefinition::array("install").acquired(),
            PropertyDefinition::string("lifecycle").acquired(),
            PropertyDefinition::string("extension_type")
                .internal()
                .default_value(json!("module")),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

fn qualify_dependency(dependency: &str) -> String {
    if dependency.contains(':') {
        dependency.to_string()
    } else {
        format!("drupal:{}", dependency)
    }
}

impl Generator for InfoFile {
    generator_data!("info_file");

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let mut info = Map::new();
        info.insert("name".into(), json!(self.data.string_of("readable_name")));
        info.insert("type".into(), json!(self.data.string_of("extension_type")));
        info.insert("description".into(), json!(self.data.string_of("short_description")));

        let package = self.data.string_of("package");
        if !package.is_empty() {
            info.insert("package".into(), json!(package));
        }

        let core = ctx.config().core_version;
        if core.major() == 8 {
            info.insert("core".into(), json!("8.x"));
        }
        info.insert("core_version_requirement".into(), json!(core.version_requirement()));

        let dependencies: Vec<String> = self
            .data
            .strings_of("dependencies")
            .iter()
            .map(|d| qualify_dependency(d))
            .collect();
        if !dependencies.is_empty() {
            info.insert("dependencies".into(), json!(dependencies));
        }

        let install = self.data.strings_of("install");
        if !install.is_empty() {
            info.insert("install".into(), json!(install));
        }

        if let Some(lifecycle) = self.data.str_of("lifecycle") {
            info.insert("lifecycle".into(), json!(lifecycle));
        }

        ctx.yaml(&format!("{}.info.yml", root), None, None, Value::Object(info))
    }
}

/// A README file.
#[derive(Debug)]
pub struct Readme {
    data: DataItem,
}

impl Readme {
    /// README properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("readable_name").acquired(),
            PropertyDefinition::string("short_description").acquired(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Readme {
    generator_data!("readme");

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let label = self.data.string_of("readable_name");
        let text = format!(
            "# {}\n\n{}\n\n## Installation\n\nInstall as you would normally install a contributed extension.\n",
            label,
            self.data.string_of("short_description")
        );
        ctx.text("README.md", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn module_item(data: Value) -> DataItem {
        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("module", Module::properties())));
        item.set(data).unwrap();
        item.apply_defaults().unwrap();
        item
    }

    #[test]
    fn test_module_defaults() {
        let item = module_item(json!({"root_name": "test_module"}));
        assert_eq!(item.str_of("readable_name"), Some("Test module"));
        assert_eq!(item.str_of("short_description"), Some("Provides Test module."));
        assert_eq!(item.str_of("package"), Some("Custom"));
        assert!(!item.bool_of("readme"));
    }

    #[test]
    fn test_module_requirements() {
        let module = Module::create(module_item(json!({
            "root_name": "test_module",
            "hooks": ["hook_help"],
            "readme": true,
        })));
        let metadata = crate::metadata::StaticMetadata::builtin().unwrap();
        let config = hookwright_types::GeneratorConfig::default();
        let ctx = RequirementContext {
            metadata: &metadata,
            config: &config,
            root_name: "test_module",
        };
        let requirements = module.required_components(&ctx).unwrap();

        assert_eq!(requirements["info"].component_type, "info_file");
        assert_eq!(requirements["hooks"].data, json!({"hooks": ["hook_help"]}));
        assert_eq!(requirements["readme"].occurrences().len(), 1);
        assert!(requirements["update_functions"].occurrences().is_empty());
        assert!(module.is_root_component());
        assert!(module.containment().is_root());
    }

    #[test]
    fn test_dependencies_are_qualified() {
        assert_eq!(qualify_dependency("node"), "drupal:node");
        assert_eq!(qualify_dependency("token:token"), "token:token");
    }
}
