//! Hook implementations, numbered updates, and the procedural files they go in.

use crate::build::BuildContext;
use crate::generator::{ContainmentLocation, Generator, Requirement, RequirementContext};
use crate::properties::{generator_data, root_component_name};
use hookwright_core::util::snake_case;
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::{ParsedProcedural, PhpFunction, Segment};
use hookwright_types::{MetadataSource, Result};
use indexmap::IndexMap;
use serde_json::json;
use tracing::debug;

const UPDATE_HOOK: &str = "hook_update_N";

/// Hook names and descriptions from metadata.
pub(crate) fn hook_options(metadata: &dyn MetadataSource) -> IndexMap<String, String> {
    metadata
        .hooks()
        .into_iter()
        .map(|h| (h.name.clone(), h.description.clone()))
        .collect()
}

/// `@file` description for a procedural file.
pub(crate) fn code_file_description(filename: &str, label: &str) -> String {
    if filename.ends_with(".install") {
        format!("Install, update and uninstall functions for the {} module.", label)
    } else if filename.ends_with(".tokens.inc") {
        format!("Builds placeholder replacement tokens for {}.", label)
    } else if filename.ends_with(".views.inc") {
        format!("Provide views data for {}.", label)
    } else if filename.ends_with(".module") {
        format!("Contains hook implementations for the {} module.", label)
    } else {
        format!("Contains functions for {}.", label)
    }
}

/// A set of hooks, fanned out to one implementation each.
#[derive(Debug)]
pub struct Hooks {
    data: DataItem,
}

impl Hooks {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::array("hooks")
                .label("Hook implementations")
                .required()
                .options_fn(hook_options),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for Hooks {
    generator_data!("hooks");

    fn required_components(&self, ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let mut requirements = IndexMap::new();
        for (index, name) in self.data.strings_of("hooks").iter().enumerate() {
            ctx.metadata
                .require_hook(name, &format!("{}/hooks/{}", self.data.path(), index))?;
            let requirement = if name == UPDATE_HOOK {
                Requirement::single("hook_update_n", json!({ "description": "Perform an update." }))
            } else {
                Requirement::single("hook_implementation", json!({ "hook_name": name }))
            };
            requirements.insert(name.clone(), requirement);
        }
        Ok(requirements)
    }
}

/// One hook implementation in the file the hook's metadata names.
#[derive(Debug)]
pub struct HookImplementation {
    data: DataItem,
}

impl HookImplementation {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("hook_name").label("Hook").required(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }

    fn hook_name(&self) -> String {
        self.data.string_of("hook_name")
    }
}

impl Generator for HookImplementation {
    generator_data!("hook_implementation");

    fn discriminator(&self) -> Option<String> {
        Some(self.hook_name())
    }

    fn required_components(&self, ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let path = format!("{}/hook_name", self.data.path());
        let hook = ctx.metadata.require_hook(&self.hook_name(), &path)?;
        let mut requirements = IndexMap::new();
        requirements.insert(
            "file".to_string(),
            Requirement::single("code_file", json!({ "filename": hook.destination_for(ctx.root_name) })),
        );
        Ok(requirements)
    }

    fn containment(&self) -> ContainmentLocation {
        ContainmentLocation::child("file")
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let hook = ctx
            .metadata()
            .require_hook(&self.hook_name(), &format!("{}/hook_name", self.data.path()))?;

        let function_name = format!("{}_{}", root, hook.short_name());
        let declaration = hook.definition.replacen(
            &format!("function {}", hook.name),
            &format!("function {}", function_name),
            1,
        );
        let body: Vec<String> = hook.body.iter().map(|line| line.replace("%module", &root)).collect();
        let function = PhpFunction::new(
            function_name,
            ctx.docblock(format!("Implements {}().", hook.name)),
            &declaration,
            &body,
        );

        let file = hook.destination_for(&root);
        let description = code_file_description(&file, &ctx.root_label()?);
        ctx.procedural(&file, &description)?.add_function(function);
        Ok(())
    }
}

/// A numbered update function in the `.install` file.
#[derive(Debug)]
pub struct HookUpdateN {
    data: DataItem,
}

impl HookUpdateN {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("description")
                .label("Update description")
                .required(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

/// Update number of a function named `{prefix}{N}`.
pub(crate) fn update_number(function_name: &str, prefix: &str) -> Option<u32> {
    function_name.strip_prefix(prefix)?.parse().ok()
}

/// Number of an existing update documented with `description`.
fn existing_update(parsed: &ParsedProcedural, prefix: &str, description: &str) -> Option<u32> {
    let summary = format!(" * {}", description);
    parsed.segments.iter().find_map(|segment| match segment {
        Segment::Function(f) if f.lines.iter().any(|l| *l == summary) => update_number(&f.name, prefix),
        _ => None,
    })
}

impl Generator for HookUpdateN {
    generator_data!("hook_update_n");

    fn discriminator(&self) -> Option<String> {
        Some(snake_case(&self.data.string_of("description")))
    }

    fn required_components(&self, ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let mut requirements = IndexMap::new();
        requirements.insert(
            "file".to_string(),
            Requirement::single("code_file", json!({ "filename": format!("{}.install", ctx.root_name) })),
        );
        Ok(requirements)
    }

    fn containment(&self) -> ContainmentLocation {
        ContainmentLocation::child("file")
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let file = format!("{}.install", root);
        let prefix = format!("{}_update_", root);
        let description = self.data.string_of("description");

        let existing = ctx.existing_procedural(&file)?;
        let reused = existing
            .as_ref()
            .and_then(|parsed| existing_update(parsed, &prefix, &description));
        let mut highest = existing
            .as_ref()
            .map(|parsed| {
                parsed
                    .function_names()
                    .into_iter()
                    .filter_map(|name| update_number(name, &prefix))
                    .max()
            })
            .unwrap_or_default();

        let first = ctx.config().core_version.first_update_number();
        let hook = ctx.metadata().hook(UPDATE_HOOK);
        let label = ctx.root_label()?;
        let docblock = ctx.docblock(description.clone());

        let procedural = ctx.procedural(&file, &code_file_description(&file, &label))?;
        for function in &procedural.functions {
            if let Some(number) = update_number(&function.name, &prefix) {
                highest = highest.max(Some(number));
            }
        }

        let number = match reused {
            Some(number) => number,
            None => highest.map_or(first, |n| n + 1),
        };
        let function_name = format!("{}{}", prefix, number);
        debug!(function = %function_name, "Numbering update function");

        let declaration = match hook {
            Some(hook) => hook.definition.replacen(UPDATE_HOOK, &function_name, 1),
            None => format!("function {}(&$sandbox)", function_name),
        };
        let body = match hook {
            Some(hook) if !hook.body.is_empty() => hook.body.clone(),
            _ => vec!["// Code for this update.".to_string()],
        };
        procedural.add_function(PhpFunction::new(function_name, docblock, &declaration, &body));
        Ok(())
    }
}

/// A procedural file other components add functions to.
#[derive(Debug)]
pub struct CodeFile {
    data: DataItem,
}

impl CodeFile {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("filename").label("File name").required(),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }
}

impl Generator for CodeFile {
    generator_data!("code_file");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("filename"))
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let filename = self.data.string_of("filename");
        let description = code_file_description(&filename, &ctx.root_label()?);
        ctx.procedural(&filename, &description)?;
        Ok(())
    }
}
