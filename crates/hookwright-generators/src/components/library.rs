use crate::build::BuildContext;
use crate::generator::Generator;
use crate::properties::{generator_data, machine_name_validator, root_component_name};
use hookwright_core::util::camel_case;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_types::Result;
use serde_json::{json, Map, Value};

fn asset_validator(extension: &'static str) -> impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync {
    move |value| match value.as_str() {
        Some(path) if path.ends_with(extension) && !path.starts_with('/') && !path.contains("..") => Ok(()),
        _ => Err(format!("{} must be a relative path ending in '{}'", value, extension)),
    }
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

/// An asset library: its `libraries.yml` entry and seed CSS and JS files.
#[derive(Debug)]
pub struct Library {
    data: DataItem,
}

impl Library {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("library_name")
                .label("Library name")
                .required()
                .validator(machine_name_validator),
            PropertyDefinition::string("version").default_value(json!("1.x")),
            PropertyDefinition::array("css")
                .label("CSS files")
                .validator(asset_validator(".css")),
            PropertyDefinition::array("js")
                .label("JavaScript files")
                .validator(asset_validator(".js")),
            PropertyDefinition::array("dependencies")
                .label("Library dependencies")
                .description("Other libraries, e.g. 'core/drupal'."),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Library {
    generator_data!("library");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("library_name"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let css = self.data.strings_of("css");
        let js = self.data.strings_of("js");

        let mut entry = Map::new();
        entry.insert("version".into(), json!(self.data.string_of("version")));
        if !css.is_empty() {
            let files: Map<String, Value> = css.iter().map(|f| (f.clone(), json!({}))).collect();
            entry.insert("css".into(), json!({ "theme": files }));
        }
        if !js.is_empty() {
            let files: Map<String, Value> = js.iter().map(|f| (f.clone(), json!({}))).collect();
            entry.insert("js".into(), Value::Object(files));
        }
        let dependencies = self.data.strings_of("dependencies");
        if !dependencies.is_empty() {
            entry.insert("dependencies".into(), json!(dependencies));
        }

        let mut file = Map::new();
        file.insert(self.data.string_of("library_name"), Value::Object(entry));
        ctx.yaml(&format!("{}.libraries.yml", root), None, Some(0), Value::Object(file))?;

        for path in &css {
            ctx.text(path, format!("/**\n * @file\n * Styles for {}.\n */\n", path))?;
        }
        for path in &js {
            let behavior = camel_case(&format!("{}_{}", root, file_stem(path)));
            ctx.text(
                path,
                format!(
                    "/**\n * @file\n * Behaviors for {}.\n */\n\n(function (Drupal) {{\n  'use strict';\n\n  \
                     Drupal.behaviors.{} = {{\n    attach(context, settings) {{\n    }},\n  }};\n}})(Drupal);\n",
                    path, behavior
                ),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ComponentScope;
    use crate::metadata::StaticMetadata;
    use hookwright_render::PhpScanner;
    use hookwright_types::{ComponentId, GeneratorConfig};
    use std::sync::Arc;

    fn library(data: Value) -> Box<dyn Generator> {
        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("library", Library::properties())));
        item.set(data).unwrap();
        item.apply_defaults().unwrap();
        Library::create(item)
    }

    #[test]
    fn test_library_files() {
        let metadata = StaticMetadata::builtin().unwrap();
        let config = GeneratorConfig::default();
        let scanner = PhpScanner::new().unwrap();
        let mut ctx = BuildContext::new(&config, &metadata, &scanner);
        ctx.enter(ComponentScope {
            id: ComponentId::new("library", "test_module", Some("alpha")),
            base_path: String::new(),
            root_name: "test_module".to_string(),
            root_label: "Test module".to_string(),
        });

        library(json!({
            "library_name": "alpha",
            "css": ["css/alpha.css"],
            "js": ["js/alpha.js"],
            "dependencies": ["core/drupal"],
        }))
        .contribute(&mut ctx)
        .unwrap();

        let artifacts = ctx.into_artifacts();
        assert_eq!(
            artifacts["test_module.libraries.yml"].render(&config),
            "alpha:\n  version: 1.x\n  css:\n    theme:\n      css/alpha.css: {  }\n  js:\n    js/alpha.js: {  }\n  dependencies:\n    - core/drupal\n"
        );
        assert!(artifacts["js/alpha.js"]
            .render(&config)
            .contains("  Drupal.behaviors.testModuleAlpha = {\n"));
        assert!(artifacts.contains_key("css/alpha.css"));
    }

    #[test]
    fn test_asset_paths_are_validated() {
        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("library", Library::properties())));
        let err = item
            .set(json!({"library_name": "alpha", "css": ["../alpha.css"]}))
            .unwrap_err();
        assert_eq!(err.path, "library/css/0");
    }
}
