use crate::build::BuildContext;
use crate::generator::Generator;
use crate::properties::{class_name_from, generator_data, machine_name_validator, root_component_name};
use hookwright_core::util::readable_name;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::{Annotation, AnnotationValue, ClassMember, ClassMetadata, Docblock, PhpClass};
use hookwright_types::Result;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

const ANNOTATION_CLASS: &str = "Drupal\\Core\\Config\\Entity\\Annotation\\ConfigEntityType";
const ATTRIBUTE_CLASS: &str = "Drupal\\Core\\Entity\\Attribute\\ConfigEntityType";

/// A config entity type: the entity class plus its config schema.
#[derive(Debug)]
pub struct ConfigEntityType {
    data: DataItem,
}

impl ConfigEntityType {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("entity_type_id")
                .label("Entity type ID")
                .required()
                .validator(machine_name_validator),
            class_name_from("entity_type_id").computed(),
            PropertyDefinition::string("label")
                .default_fn(|ctx| Ok(json!(readable_name(&ctx.get_str("entity_type_id")?)))),
            PropertyDefinition::complex("entity_properties")
                .label("Entity properties")
                .multiple()
                .property(
                    PropertyDefinition::string("name")
                        .required()
                        .validator(machine_name_validator),
                )
                .property(
                    PropertyDefinition::string("type")
                        .options([
                            ("string", "String"),
                            ("label", "Translatable label"),
                            ("text", "Text"),
                            ("boolean", "Boolean"),
                            ("integer", "Integer"),
                            ("uuid", "UUID"),
                        ])
                        .default_value(json!("string")),
                )
                .property(
                    PropertyDefinition::string("label")
                        .default_fn(|ctx| Ok(json!(readable_name(&ctx.get_str("name")?)))),
                ),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }

    /// `(name, type, label)` of every stored property, including id and label.
    fn stored_properties(&self) -> Vec<(String, String, String)> {
        let mut properties = vec![
            ("id".to_string(), "string".to_string(), "ID".to_string()),
            ("label".to_string(), "label".to_string(), "Label".to_string()),
        ];
        if let Some(list) = self.data.get("entity_properties") {
            for entry in list.items() {
                properties.push((entry.string_of("name"), entry.string_of("type"), entry.string_of("label")));
            }
        }
        properties
    }

    fn definition(&self, class_short: String, root: &str) -> Annotation {
        let id = self.data.string_of("entity_type_id");
        let mut keys = IndexMap::new();
        keys.insert("id".to_string(), AnnotationValue::Str("id".into()));
        keys.insert("label".to_string(), AnnotationValue::Str("label".into()));

        Annotation::new(class_short)
            .value("id", id.clone())
            .value("label", AnnotationValue::Translation(self.data.string_of("label")))
            .value("config_prefix", id)
            .value("entity_keys", AnnotationValue::Map(keys))
            .value(
                "config_export",
                AnnotationValue::List(
                    self.stored_properties()
                        .into_iter()
                        .map(|(name, _, _)| AnnotationValue::Str(name))
                        .collect(),
                ),
            )
            .value("provider", root.to_string())
    }
}

impl Generator for ConfigEntityType {
    generator_data!("config_entity_type");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("entity_type_id"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let width = ctx.config().docblock_width;
        let class_name = self.data.string_of("class_name");
        let label = self.data.string_of("label");

        let mut class = PhpClass::new(format!("Drupal\\{}\\Entity", root), class_name.clone());
        class.docblock = Docblock::new(format!("Defines the {} entity type.", label)).width(width);
        class.extends = Some(class.import("Drupal\\Core\\Config\\Entity\\ConfigEntityBase"));

        if ctx.config().core_version.uses_attributes() {
            let short = class.import(ATTRIBUTE_CLASS);
            class.import("Drupal\\Core\\StringTranslation\\TranslatableMarkup");
            class.metadata = Some(ClassMetadata::Attribute(self.definition(short, &root)));
        } else {
            let short = hookwright_render::short_class_name(ANNOTATION_CLASS).to_string();
            class.metadata = Some(ClassMetadata::Annotation(self.definition(short, &root)));
        }

        let mut mapping = Map::new();
        for (name, property_type, property_label) in self.stored_properties() {
            let php_type = match property_type.as_str() {
                "boolean" => "bool",
                "integer" => "int",
                _ => "string",
            };
            class.add_member(ClassMember::property(
                name.clone(),
                Docblock::new(format!("The {} {}.", label, property_label.to_lowercase()))
                    .width(width)
                    .tag("var", php_type),
                &format!("protected ${}", name),
            ));
            mapping.insert(name, json!({ "type": property_type, "label": property_label }));
        }

        ctx.declare_class(&format!("src/Entity/{}.php", class_name), class)?;

        let schema_key = format!("{}.{}.*", root, self.data.string_of("entity_type_id"));
        let schema = json!({
            schema_key: {
                "type": "config_entity",
                "label": format!("{} config", label),
                "mapping": Value::Object(mapping),
            }
        });
        ctx.yaml(&format!("config/schema/{}.schema.yml", root), None, Some(0), schema)
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

    fn entity(data: Value) -> Box<dyn Generator> {
        let def = PropertyDefinition::root("config_entity_type", ConfigEntityType::properties());
        let mut item = DataItem::new(Arc::new(def));
        item.set(data).unwrap();
        item.apply_defaults().unwrap();
        ConfigEntityType::create(item)
    }

    #[test]
    fn test_schema_blocks_are_separated() {
        let metadata = StaticMetadata::builtin().unwrap();
        let config = GeneratorConfig::default();
        let scanner = PhpScanner::new().unwrap();
        let mut ctx = BuildContext::new(&config, &metadata, &scanner);

        for id in ["alpha", "beta"] {
            ctx.enter(ComponentScope {
                id: ComponentId::new("config_entity_type", "test_module", Some(id)),
                base_path: String::new(),
                root_name: "test_module".to_string(),
                root_label: "Test module".to_string(),
            });
            entity(json!({"entity_type_id": id, "entity_properties": [{"name": "weight", "type": "integer"}]}))
                .contribute(&mut ctx)
                .unwrap();
        }

        let artifacts = ctx.into_artifacts();
        let schema = artifacts["config/schema/test_module.schema.yml"].render(&config);
        assert!(schema.starts_with("'test_module.alpha.*':\n  type: config_entity\n  label: 'Alpha config'\n  mapping:\n"));
        assert!(schema.contains("    weight:\n      type: integer\n      label: Weight\n\n'test_module.beta.*':\n"));
        assert_eq!(schema.matches("\n\n").count(), 1);

        let class = artifacts["src/Entity/Alpha.php"].render(&config);
        assert!(class.contains("#[ConfigEntityType(\n  id: 'alpha',\n  label: new TranslatableMarkup('Alpha'),\n"));
        assert!(class.contains("  config_export: [\n    'id',\n    'label',\n    'weight',\n  ],\n"));
        assert!(class.contains("   * @var int\n   */\n  protected $weight;"));
    }
}
