//! List component types and hooks.

use anyhow::Result;
use colored::Colorize;
use hookwright_generators::{GeneratorRegistry, StaticMetadata};
use hookwright_types::MetadataSource;

pub fn components(all: bool) -> Result<()> {
    println!("{} component types", "Listing".green().bold());

    let registry = GeneratorRegistry::standard();
    let mut types: Vec<_> = registry.types().filter(|t| all || t.root).collect();
    types.sort_by_key(|t| t.name);

    for component_type in types {
        let marker = if component_type.root { " (root)".dimmed().to_string() } else { String::new() };
        println!(
            "  {}{}  {}",
            component_type.name.cyan().bold(),
            marker,
            component_type.description
        );
    }
    Ok(())
}

pub fn hooks(group: Option<&str>) -> Result<()> {
    println!("{} hooks", "Listing".green().bold());

    let metadata = StaticMetadata::builtin()?;
    let mut current_group: Option<&str> = None;
    let mut found_any = false;

    for hook in metadata.hooks() {
        if group.map_or(false, |g| g != hook.group) {
            continue;
        }
        found_any = true;
        if current_group != Some(hook.group.as_str()) {
            println!("\n{}:", hook.group.cyan().bold());
            current_group = Some(hook.group.as_str());
        }
        println!("  {}  {}", hook.name, hook.description.dimmed());
    }

    if !found_any {
        println!("  {} No hooks found", "!".yellow());
    }
    Ok(())
}
