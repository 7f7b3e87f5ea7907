//! Built-in component types.

mod config_entity;
mod hooks;
mod library;
mod module;
mod phpunit;
mod plugin;
mod routing;
mod service;

pub use config_entity::ConfigEntityType;
pub use hooks::{CodeFile, HookImplementation, HookUpdateN, Hooks};
pub use library::Library;
pub use module::{InfoFile, Module, Readme, TestModule};
pub use phpunit::PhpUnitTest;
pub use plugin::Plugin;
pub use routing::{Controller, Permission, Route};
pub use service::Service;

use crate::registry::ComponentType;

/// Every built-in component type.
pub fn builtin() -> Vec<ComponentType> {
    vec![
        ComponentType {
            name: "module",
            description: "A module: the top-level extension",
            schema: Module::properties,
            factory: Module::create,
            root: true,
        },
        ComponentType {
            name: "profile",
            description: "An installation profile",
            schema: Module::profile_properties,
            factory: Module::create_profile,
            root: true,
        },
        ComponentType {
            name: "test_module",
            description: "A test fixture module inside another module",
            schema: TestModule::properties,
            factory: TestModule::create,
            root: false,
        },
        ComponentType {
            name: "info_file",
            description: "The extension's .info.yml file",
            schema: InfoFile::properties,
            factory: InfoFile::create,
            root: false,
        },
        ComponentType {
            name: "readme",
            description: "A README.md file",
            schema: Readme::properties,
            factory: Readme::create,
            root: false,
        },
        ComponentType {
            name: "hooks",
            description: "A set of hook implementations",
            schema: Hooks::properties,
            factory: Hooks::create,
            root: false,
        },
        ComponentType {
            name: "hook_implementation",
            description: "One hook implementation",
            schema: HookImplementation::properties,
            factory: HookImplementation::create,
            root: false,
        },
        ComponentType {
            name: "hook_update_n",
            description: "A numbered update function",
            schema: HookUpdateN::properties,
            factory: HookUpdateN::create,
            root: false,
        },
        ComponentType {
            name: "code_file",
            description: "A procedural code file",
            schema: CodeFile::properties,
            factory: CodeFile::create,
            root: false,
        },
        ComponentType {
            name: "service",
            description: "A service class and its services.yml entry",
            schema: Service::properties,
            factory: Service::create,
            root: false,
        },
        ComponentType {
            name: "plugin",
            description: "A plugin class",
            schema: Plugin::properties,
            factory: Plugin::create,
            root: false,
        },
        ComponentType {
            name: "route",
            description: "A route and its controller method",
            schema: Route::properties,
            factory: Route::create,
            root: false,
        },
        ComponentType {
            name: "controller",
            description: "A controller class",
            schema: Controller::properties,
            factory: Controller::create,
            root: false,
        },
        ComponentType {
            name: "permission",
            description: "A permission",
            schema: Permission::properties,
            factory: Permission::create,
            root: false,
        },
        ComponentType {
            name: "config_entity_type",
            description: "A config entity type and its schema",
            schema: ConfigEntityType::properties,
            factory: ConfigEntityType::create,
            root: false,
        },
        ComponentType {
            name: "phpunit_test",
            description: "A PHPUnit test class",
            schema: PhpUnitTest::properties,
            factory: PhpUnitTest::create,
            root: false,
        },
        ComponentType {
            name: "library",
            description: "An asset library and its CSS and JS files",
            schema: Library::properties,
            factory: Library::create,
            root: false,
        },
    ]
}
