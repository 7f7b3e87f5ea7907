//! Dependency injection boilerplate for generated classes.

use hookwright_core::util::camel_case;
use hookwright_render::{ClassMember, Docblock, PhpClass};
use hookwright_types::{MetadataSource, Result, ServiceInfo};

const CONTAINER_INTERFACE: &str = "Symfony\\Component\\DependencyInjection\\ContainerInterface";

/// How the class receives its services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionStyle {
    /// Constructor arguments wired by the service container
    Service,
    /// A static `create()` factory reading from the container
    Container,
    /// A plugin `create()` factory passing the plugin arguments through
    Plugin,
}

/// One injected service.
#[derive(Debug, Clone)]
pub struct Injection {
    /// Service id
    pub id: String,
    /// Class property name
    pub property: String,
    /// Constructor parameter name
    pub parameter: String,
    /// Interface type-hint
    pub interface: String,
    /// Property docblock summary
    pub description: String,
}

impl Injection {
    fn from_info(info: &ServiceInfo) -> Self {
        let parameter = info.id.replace('.', "_");
        Self {
            id: info.id.clone(),
            property: if info.variable_name.is_empty() {
                camel_case(&info.id)
            } else {
                info.variable_name.clone()
            },
            parameter,
            interface: info.interface.clone(),
            description: if info.description.is_empty() {
                format!("The {} service.", info.id)
            } else {
                info.description.clone()
            },
        }
    }
}

/// Look up injected services, reporting unknown ids against `path`.
pub fn resolve(metadata: &dyn MetadataSource, ids: &[String], path: &str) -> Result<Vec<Injection>> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            metadata
                .require_service(id, &format!("{}/{}", path, index))
                .map(Injection::from_info)
        })
        .collect()
}

/// Service container arguments for a services.yml entry.
pub fn container_arguments(injections: &[Injection]) -> Vec<String> {
    injections.iter().map(|i| format!("@{}", i.id)).collect()
}

/// Add properties, constructor, and factory for `injections` to `class`.
pub fn inject(class: &mut PhpClass, injections: &[Injection], style: InjectionStyle, width: usize) {
    if injections.is_empty() {
        return;
    }

    let mut parameters = Vec::new();
    let mut assignments = Vec::new();
    let mut constructor_doc = Docblock::new(format!("Constructs a new {} object.", class.name)).width(width);

    if style == InjectionStyle::Plugin {
        parameters.extend([
            "array $configuration".to_string(),
            "$plugin_id".to_string(),
            "$plugin_definition".to_string(),
        ]);
        constructor_doc = constructor_doc
            .tag("param", "array $configuration")
            .tag("param", "string $plugin_id")
            .tag("param", "mixed $plugin_definition");
        assignments.push("parent::__construct($configuration, $plugin_id, $plugin_definition);".to_string());
    }

    for injection in injections {
        let short = class.import(&injection.interface);
        class.add_member(ClassMember::property(
            injection.property.clone(),
            Docblock::new(injection.description.clone())
                .width(width)
                .tag("var", format!("\\{}", injection.interface)),
            &format!("protected {} ${}", short, injection.property),
        ));
        parameters.push(format!("{} ${}", short, injection.parameter));
        constructor_doc = constructor_doc.tag(
            "param",
            format!("\\{} ${}", injection.interface, injection.parameter),
        );
        assignments.push(format!("$this->{} = ${};", injection.property, injection.parameter));
    }

    class.add_member(ClassMember::method(
        "__construct",
        constructor_doc,
        &format!("public function __construct({})", parameters.join(", ")),
        &assignments,
    ));

    match style {
        InjectionStyle::Service => {}
        InjectionStyle::Container => {
            let container = class.import(CONTAINER_INTERFACE);
            let mut body = vec!["return new static(".to_string()];
            body.extend(container_gets(injections));
            body.push(");".to_string());
            class.add_member(ClassMember::method(
                "create",
                Docblock::new("{@inheritdoc}"),
                &format!("public static function create({} $container)", container),
                &body,
            ));
        }
        InjectionStyle::Plugin => {
            let container = class.import(CONTAINER_INTERFACE);
            let factory = class.import("Drupal\\Core\\Plugin\\ContainerFactoryPluginInterface");
            if !class.implements.contains(&factory) {
                class.implements.push(factory);
            }
            let mut body = vec![
                "return new static(".to_string(),
                "  $configuration,".to_string(),
                "  $plugin_id,".to_string(),
                "  $plugin_definition,".to_string(),
            ];
            body.extend(container_gets(injections));
            body.push(");".to_string());
            class.add_member(ClassMember::method(
                "create",
                Docblock::new("{@inheritdoc}"),
                &format!(
                    "public static function create({} $container, array $configuration, $plugin_id, $plugin_definition)",
                    container
                ),
                &body,
            ));
        }
    }
}

fn container_gets(injections: &[Injection]) -> Vec<String> {
    injections
        .iter()
        .enumerate()
        .map(|(index, injection)| {
            let separator = if index + 1 < injections.len() { "," } else { "" };
            format!("  $container->get('{}'){}", injection.id, separator)
        })
        .collect()
}
