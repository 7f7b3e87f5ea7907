//! Component type schemas.

use crate::cli::SchemaFormat;
use anyhow::{Context, Result};
use hookwright_engine::Pipeline;
use hookwright_types::GeneratorConfig;

pub fn execute(component_type: &str, format: SchemaFormat, config: GeneratorConfig) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let schema = pipeline
        .schema(component_type)
        .with_context(|| format!("No schema for '{}'", component_type))?;

    let text = match format {
        SchemaFormat::Yaml => serde_yaml::to_string(&schema)?,
        SchemaFormat::Json => serde_json::to_string_pretty(&schema)? + "\n",
    };
    print!("{}", text);
    Ok(())
}
