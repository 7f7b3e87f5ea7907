//! Routes, their controllers, and permissions.

use crate::build::BuildContext;
use crate::generator::{ContainmentLocation, Generator, Requirement, RequirementContext};
use crate::injection::{self, InjectionStyle};
use crate::properties::{generator_data, injected_services, machine_name_validator, root_component_name};
use hookwright_core::util::{camel_case, pascal_case, readable_name};
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::{ClassMember, PhpClass};
use hookwright_types::Result;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

fn controller_path(class_name: &str) -> String {
    format!("src/Controller/{}.php", class_name)
}

/// A route in `routing.yml` served by a controller method.
#[derive(Debug)]
pub struct Route {
    data: DataItem,
}

impl Route {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("route_name")
                .label("Route name")
                .required()
                .validator(machine_name_validator),
            PropertyDefinition::string("path")
                .label("Path")
                .required()
                .validator(|value| match value.as_str() {
                    Some(path) if path.starts_with('/') => Ok(()),
                    _ => Err(format!("{} must start with '/'", value)),
                }),
            PropertyDefinition::string("title")
                .default_fn(|ctx| Ok(json!(readable_name(&ctx.get_str("route_name")?)))),
            PropertyDefinition::string("controller")
                .label("Controller class")
                .default_fn(|ctx| {
                    Ok(json!(format!("{}Controller", pascal_case(&ctx.get_str("root_component_name")?))))
                }),
            PropertyDefinition::string("method")
                .label("Controller method")
                .default_fn(|ctx| Ok(json!(camel_case(&ctx.get_str("route_name")?)))),
            PropertyDefinition::string("permission")
                .label("Required permission")
                .default_value(json!("access content")),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Route {
    generator_data!("route");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("route_name"))
    }

    fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let mut requirements = IndexMap::new();
        requirements.insert(
            "controller".to_string(),
            Requirement::single("controller", json!({ "class_name": self.data.string_of("controller") })),
        );
        Ok(requirements)
    }

    fn containment(&self) -> ContainmentLocation {
        ContainmentLocation::child("controller")
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let controller = self.data.string_of("controller");
        let method = self.data.string_of("method");
        let title = self.data.string_of("title");

        let route_id = format!("{}.{}", root, self.data.string_of("route_name"));
        let route = json!({
            route_id: {
                "path": self.data.string_of("path"),
                "defaults": {
                    "_controller": format!("\\Drupal\\{}\\Controller\\{}::{}", root, controller, method),
                    "_title": title,
                },
                "requirements": {
                    "_permission": self.data.string_of("permission"),
                },
            }
        });
        ctx.yaml(&format!("{}.routing.yml", root), None, Some(0), route)?;

        let docblock = ctx.docblock(format!("Builds the response for the {} page.", title));
        let body = [
            "$build['content'] = [",
            "  '#type' => 'item',",
            "  '#markup' => $this->t('It works!'),",
            "];",
            "",
            "return $build;",
        ]
        .map(String::from);
        ctx.class_mut(&controller_path(&controller))?.add_member(ClassMember::method(
            method.clone(),
            docblock,
            &format!("public function {}()", method),
            &body,
        ));
        Ok(())
    }
}

/// A controller class that routes add methods to.
#[derive(Debug)]
pub struct Controller {
    data: DataItem,
}

impl Controller {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("class_name").label("Class name").required(),
            injected_services(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Controller {
    generator_data!("controller");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("class_name"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let class_name = self.data.string_of("class_name");
        let injections = injection::resolve(
            ctx.metadata(),
            &self.data.strings_of("injected_services"),
            &format!("{}/injected_services", self.data.path()),
        )?;

        let mut class = PhpClass::new(format!("Drupal\\{}\\Controller", root), class_name.clone());
        class.docblock = ctx.docblock(format!("Returns responses for {} routes.", ctx.root_label()?));
        class.extends = Some(class.import("Drupal\\Core\\Controller\\ControllerBase"));
        injection::inject(&mut class, &injections, InjectionStyle::Container, ctx.config().docblock_width);

        ctx.declare_class(&controller_path(&class_name), class)
    }
}

/// A permission in `permissions.yml`.
#[derive(Debug)]
pub struct Permission {
    data: DataItem,
}

impl Permission {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("permission")
                .label("Permission machine name")
                .description("Lower case words, e.g. 'administer alpha'.")
                .required(),
            PropertyDefinition::string("title").default_fn(|ctx| {
                let permission = ctx.get_str("permission")?;
                let mut chars = permission.chars();
                Ok(json!(match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }))
            }),
            PropertyDefinition::string("description"),
            PropertyDefinition::boolean("restrict_access")
                .label("Restrict access")
                .default_value(json!(false)),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Permission {
    generator_data!("permission");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("permission"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let mut entry = Map::new();
        entry.insert("title".into(), json!(self.data.string_of("title")));
        if let Some(description) = self.data.str_of("description") {
            entry.insert("description".into(), json!(description));
        }
        if self.data.bool_of("restrict_access") {
            entry.insert("restrict access".into(), json!(true));
        }

        let mut file = Map::new();
        file.insert(self.data.string_of("permission"), Value::Object(entry));
        ctx.yaml(&format!("{}.permissions.yml", root), None, Some(0), Value::Object(file))
    }
}
