//! Extension generation.

use crate::ui::{self, FileStatus};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use hookwright_core::util::load_yaml_file;
use hookwright_engine::{ExistingExtension, GeneratedFile, Pipeline};
use hookwright_generators::StaticMetadata;
use hookwright_types::{ExtensionReader, GenerationError, GeneratorConfig};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments of the generate command.
pub struct GenerateOptions<'a> {
    pub request: &'a Path,
    pub component_type: &'a str,
    pub output: Option<&'a Path>,
    pub existing: Option<&'a Path>,
    pub dry_run: bool,
    pub stdout: bool,
    pub metadata: Option<&'a Path>,
    pub quiet: bool,
}

pub fn execute(options: &GenerateOptions<'_>, config: GeneratorConfig) -> Result<()> {
    let data = load_request(options.request)?;
    let root_name = data
        .get("root_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut pipeline = Pipeline::new(config)?;
    if let Some(path) = options.metadata {
        let table = StaticMetadata::from_yaml_file(path)?;
        pipeline = pipeline.with_metadata(Box::new(table));
    }

    let output = match options.output {
        Some(path) => path.to_path_buf(),
        None if !root_name.is_empty() => PathBuf::from(&root_name),
        None => bail!("The request has no root_name; pass --output"),
    };

    let existing_dir = options
        .existing
        .map(Path::to_path_buf)
        .or_else(|| output.is_dir().then(|| output.clone()));
    let existing = match &existing_dir {
        Some(dir) => Some(
            ExistingExtension::load(dir)
                .with_context(|| format!("Failed to read existing extension {}", dir.display()))?,
        ),
        None => None,
    };
    debug!(existing = ?existing_dir, files = existing.as_ref().map_or(0, |e| e.len()), "Existing extension");

    if !options.quiet && !options.stdout {
        println!(
            "{} {} {}",
            "Generating".green().bold(),
            options.component_type,
            root_name.cyan()
        );
    }

    let result = pipeline
        .generate(
            options.component_type,
            data,
            existing.as_ref().map(|e| e as &dyn ExtensionReader),
        )
        .map_err(explain)?;

    if options.stdout {
        for file in result.files.values() {
            println!("{}", format!("==> {} <==", file.path).bold());
            print!("{}", file.content);
            println!();
        }
        return Ok(());
    }

    let statuses: Vec<(FileStatus, &GeneratedFile)> = result
        .files
        .values()
        .map(|file| (status(&output, file), file))
        .collect();
    if !options.quiet {
        for (status, file) in &statuses {
            ui::file(*status, &file.path);
        }
    }

    if options.dry_run {
        if !options.quiet {
            ui::note("Dry run: nothing written");
        }
        return Ok(());
    }

    let written = result
        .write_to(&output)
        .with_context(|| format!("Failed to write to {}", output.display()))?;
    if !options.quiet {
        ui::success(&format!("Wrote {} of {} files to {}", written.len(), statuses.len(), output.display()));
    }
    Ok(())
}

fn load_request(path: &Path) -> Result<Value> {
    let value = load_yaml_file(path).with_context(|| format!("Failed to read request {}", path.display()))?;
    match value {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::Object(_) => Ok(value),
        _ => bail!("Request {} must be a mapping", path.display()),
    }
}

/// What writing `file` below `dir` would do.
fn status(dir: &Path, file: &GeneratedFile) -> FileStatus {
    match std::fs::read_to_string(dir.join(&file.path)) {
        Err(_) => FileStatus::Create,
        Ok(current) if file.is_unchanged(&current) => FileStatus::Unchanged,
        Ok(_) if file.merged => FileStatus::Merge,
        Ok(_) => FileStatus::Update,
    }
}

fn explain(error: GenerationError) -> anyhow::Error {
    if error.is_user_error() {
        anyhow::Error::new(error).context("Invalid request")
    } else {
        anyhow::Error::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_types::FileType;

    #[test]
    fn test_status_against_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("same.yml"), "a: b\n").unwrap();
        std::fs::write(dir.path().join("old.module"), "<?php\n").unwrap();

        let same = GeneratedFile::new("same.yml", "a: b\n".to_string(), FileType::Yaml).existing(true);
        let merged = GeneratedFile::new("old.module", "<?php\n\n".to_string(), FileType::Procedural).existing(true);
        let new = GeneratedFile::new("new.module", "<?php\n".to_string(), FileType::Procedural);

        assert_eq!(status(dir.path(), &same), FileStatus::Unchanged);
        assert_eq!(status(dir.path(), &merged), FileStatus::Merge);
        assert_eq!(status(dir.path(), &new), FileStatus::Create);
    }

    #[test]
    fn test_request_must_be_a_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("list.yml");
        std::fs::write(&list, "- a\n- b\n").unwrap();
        assert!(load_request(&list).is_err());

        let empty = dir.path().join("empty.yml");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(load_request(&empty).unwrap(), serde_json::json!({}));
    }
}
