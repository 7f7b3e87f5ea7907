use crate::build::BuildContext;
use crate::generator::Generator;
use crate::injection::{self, InjectionStyle};
use crate::properties::{class_name_from, generator_data, injected_services, machine_name_validator, root_component_name};
use hookwright_core::util::readable_name;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::PhpClass;
use hookwright_types::Result;
use serde_json::{json, Map, Value};

/// A service: a class plus its entry in `services.yml`.
///
/// Services are identified by name within their root, so two requests for
/// the same service merge, with their injected services unioned.
#[derive(Debug)]
pub struct Service {
    data: DataItem,
}

impl Service {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("service_name")
                .label("Service name")
                .description("Machine name; the service id is prefixed with the extension name.")
                .required()
                .validator(machine_name_validator),
            class_name_from("service_name"),
            PropertyDefinition::string("description")
                .default_fn(|ctx| Ok(json!(format!("{} service.", readable_name(&ctx.get_str("service_name")?))))),
            injected_services(),
            PropertyDefinition::array("tags")
                .label("Service tags")
                .description("Tag names, e.g. 'event_subscriber'."),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Service {
    generator_data!("service");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("service_name"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let class_name = self.data.string_of("class_name");
        let injections = injection::resolve(
            ctx.metadata(),
            &self.data.strings_of("injected_services"),
            &format!("{}/injected_services", self.data.path()),
        )?;

        let mut class = PhpClass::new(format!("Drupal\\{}", root), class_name.clone());
        class.docblock = ctx.docblock(self.data.string_of("description"));
        injection::inject(&mut class, &injections, InjectionStyle::Service, ctx.config().docblock_width);

        let mut entry = Map::new();
        entry.insert("class".into(), json!(class.qualified_name()));
        if !injections.is_empty() {
            entry.insert("arguments".into(), json!(injection::container_arguments(&injections)));
        }
        let tags: Vec<Value> = self
            .data
            .strings_of("tags")
            .into_iter()
            .map(|tag| json!({ "name": tag }))
            .collect();
        if !tags.is_empty() {
            entry.insert("tags".into(), Value::Array(tags));
        }

        let id = format!("{}.{}", root, self.data.string_of("service_name"));
        ctx.yaml(
            &format!("{}.services.yml", root),
            Some(3),
            Some(1),
            json!({ "services": { id: entry } }),
        )?;
        ctx.declare_class(&format!("src/{}.php", class_name), class)
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

    fn service(data: Value) -> Box<dyn Generator> {
        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("service", Service::properties())));
        item.set(data).unwrap();
        item.apply_defaults().unwrap();
        Service::create(item)
    }

    #[test]
    fn test_service_contribution() {
        let metadata = StaticMetadata::builtin().unwrap();
        let config = GeneratorConfig::default();
        let scanner = PhpScanner::new().unwrap();
        let mut ctx = BuildContext::new(&config, &metadata, &scanner);
        ctx.enter(ComponentScope {
            id: ComponentId::from("service:test_module:alpha"),
            base_path: String::new(),
            root_name: "test_module".to_string(),
            root_label: "Test module".to_string(),
        });

        let alpha = service(json!({"service_name": "alpha", "injected_services": ["current_user"]}));
        assert_eq!(alpha.discriminator().as_deref(), Some("alpha"));
        alpha.contribute(&mut ctx).unwrap();

        let artifacts = ctx.into_artifacts();
        assert_eq!(
            artifacts["test_module.services.yml"].render(&config),
            "services:\n  test_module.alpha:\n    class: Drupal\\test_module\\Alpha\n    arguments: ['@current_user']\n"
        );
        let class = artifacts["src/Alpha.php"].render(&config);
        assert!(class.contains("namespace Drupal\\test_module;"));
        assert!(class.contains(" * Alpha service.\n */\nclass Alpha {"));
    }

    #[test]
    fn test_invalid_service_name() {
        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("service", Service::properties())));
        let err = item.set(json!({"service_name": "Not valid"})).unwrap_err();
        assert_eq!(err.path, "service/service_name");
    }
}
