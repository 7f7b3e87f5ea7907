use crate::build::BuildContext;
use crate::generator::Generator;
use crate::injection::{self, InjectionStyle};
use crate::properties::{class_name_from, generator_data, injected_services, machine_name_validator, root_component_name};
use hookwright_core::util::readable_name;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::{Annotation, AnnotationValue, ClassMember, ClassMetadata, Docblock, PhpClass};
use hookwright_types::{MetadataSource, PluginTypeInfo, Result};
use indexmap::IndexMap;
use serde_json::json;

fn plugin_type_options(metadata: &dyn MetadataSource) -> IndexMap<String, String> {
    metadata
        .plugin_types()
        .into_iter()
        .map(|p| (p.id.clone(), readable_name(&p.id)))
        .collect()
}

/// A plugin class of a type known to metadata.
#[derive(Debug)]
pub struct Plugin {
    data: DataItem,
}

impl Plugin {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("plugin_type")
                .label("Plugin type")
                .required()
                .options_fn(plugin_type_options),
            PropertyDefinition::string("plugin_name")
                .label("Plugin name")
                .required()
                .validator(machine_name_validator),
            class_name_from("plugin_name"),
            PropertyDefinition::string("label")
                .default_fn(|ctx| Ok(json!(readable_name(&ctx.get_str("plugin_name")?)))),
            injected_services(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }

    /// Definition value for one metadata key.
    fn definition_value(&self, key: &str, rule: &str, plugin_id: &str) -> AnnotationValue {
        let label = self.data.string_of("label");
        if let Some(text) = rule.strip_prefix("@translation:") {
            AnnotationValue::Translation(text.to_string())
        } else if rule == "@translation" {
            AnnotationValue::Translation(label)
        } else if let Some(items) = rule.strip_prefix("@list:") {
            AnnotationValue::List(
                items
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| AnnotationValue::Str(s.trim().to_string()))
                    .collect(),
            )
        } else if rule.is_empty() && key == "id" {
            AnnotationValue::Str(plugin_id.to_string())
        } else if rule.is_empty() {
            AnnotationValue::Str(label)
        } else {
            AnnotationValue::Str(rule.to_string())
        }
    }

    fn definition(&self, info: &PluginTypeInfo, class_short: String, plugin_id: &str) -> Annotation {
        let mut annotation = Annotation::new(class_short);
        for (key, rule) in &info.definition_keys {
            annotation = annotation.value(key.clone(), self.definition_value(key, rule, plugin_id));
        }
        annotation
    }
}

impl Generator for Plugin {
    generator_data!("plugin");

    fn discriminator(&self) -> Option<String> {
        Some(format!(
            "{}.{}",
            self.data.string_of("plugin_type"),
            self.data.string_of("plugin_name")
        ))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let info = ctx
            .metadata()
            .require_plugin_type(&self.data.string_of("plugin_type"), &format!("{}/plugin_type", self.data.path()))?;
        let injections = injection::resolve(
            ctx.metadata(),
            &self.data.strings_of("injected_services"),
            &format!("{}/injected_services", self.data.path()),
        )?;
        let width = ctx.config().docblock_width;

        let class_name = self.data.string_of("class_name");
        let mut class = PhpClass::new(format!("Drupal\\{}\\Plugin\\{}", root, info.subdir), class_name.clone());
        let parent = class.import(&info.base_class);
        class.extends = Some(parent);

        let plugin_id = format!("{}_{}", root, self.data.string_of("plugin_name"));
        class.docblock = Docblock::new(format!(
            "Provides the {} {} plugin.",
            self.data.string_of("label"),
            readable_name(&info.id).to_lowercase()
        ))
        .width(width);

        match (&info.attribute_class, ctx.config().core_version.uses_attributes()) {
            (Some(attribute_class), true) => {
                let short = class.import(attribute_class);
                let attribute = self.definition(info, short, &plugin_id);
                if attribute.uses_translation() {
                    class.import("Drupal\\Core\\StringTranslation\\TranslatableMarkup");
                }
                class.metadata = Some(ClassMetadata::Attribute(attribute));
            }
            _ => {
                let short = hookwright_render::short_class_name(&info.annotation_class).to_string();
                class.metadata = Some(ClassMetadata::Annotation(self.definition(info, short, &plugin_id)));
            }
        }

        injection::inject(&mut class, &injections, InjectionStyle::Plugin, width);

        for (name, method) in &info.methods {
            class.add_member(ClassMember::method(
                name.clone(),
                Docblock::new("{@inheritdoc}"),
                &method.declaration,
                &method.body,
            ));
        }

        let path = format!("src/Plugin/{}/{}.php", info.subdir.replace('\\', "/"), class_name);
        ctx.declare_class(&path, class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ComponentScope;
    use crate::metadata::StaticMetadata;
    use hookwright_render::PhpScanner;
    use hookwright_types::{ComponentId, CoreVersion, GeneratorConfig};
    use serde_json::Value;
    use std::sync::Arc;

    fn render(data: Value, core: u32) -> (String, String) {
        let metadata = StaticMetadata::builtin().unwrap();
        let config = GeneratorConfig {
            core_version: CoreVersion::new(core).unwrap(),
            ..Default::default()
        };
        let scanner = PhpScanner::new().unwrap();
        let mut ctx = BuildContext::new(&config, &metadata, &scanner);
        ctx.enter(ComponentScope {
            id: ComponentId::from("plugin:test_module:block.alpha"),
            base_path: String::new(),
            root_name: "test_module".to_string(),
            root_label: "Test module".to_string(),
        });

        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("plugin", Plugin::properties())));
        item.set(data).unwrap();
        item.apply_defaults().unwrap();
        Plugin::create(item).contribute(&mut ctx).unwrap();

        let (path, artifact) = ctx.artifacts().first().map(|(p, a)| (p.clone(), a.clone())).unwrap();
        (path, artifact.render(&config))
    }

    #[test]
    fn test_block_annotation_for_older_cores() {
        let (path, text) = render(json!({"plugin_type": "block", "plugin_name": "alpha"}), 9);
        assert_eq!(path, "src/Plugin/Block/Alpha.php");
        assert!(text.contains("namespace Drupal\\test_module\\Plugin\\Block;"));
        assert!(text.contains("use Drupal\\Core\\Block\\BlockBase;"));
        assert!(text.contains(" * @Block(\n *   id = \"test_module_alpha\",\n *   admin_label = @Translation(\"Alpha\"),\n"));
        assert!(text.contains("class Alpha extends BlockBase {"));
        assert!(text.contains("  public function build() {"));
    }

    #[test]
    fn test_block_attribute_with_injection() {
        let (_, text) = render(
            json!({"plugin_type": "block", "plugin_name": "alpha", "injected_services": ["current_user"]}),
            10,
        );
        assert!(text.contains("use Drupal\\Core\\Block\\Attribute\\Block;"));
        assert!(text.contains("use Drupal\\Core\\StringTranslation\\TranslatableMarkup;"));
        assert!(text.contains("#[Block(\n  id: 'test_module_alpha',\n  admin_label: new TranslatableMarkup('Alpha'),\n"));
        assert!(text.contains("class Alpha extends BlockBase implements ContainerFactoryPluginInterface {"));
    }

    #[test]
    fn test_nested_plugin_directory() {
        let (path, text) = render(json!({"plugin_type": "field_formatter", "plugin_name": "fancy"}), 10);
        assert_eq!(path, "src/Plugin/Field/FieldFormatter/Fancy.php");
        assert!(text.contains("  field_types: [\n    'string',\n  ],\n"));
    }
}
