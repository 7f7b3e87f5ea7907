//! Merging assembled files into files that already exist on disk.
//!
//! Hand-written content the regenerated components do not touch is kept
//! verbatim. What counts as "touched" depends on the file type:
//!
//! | file type  | regenerated unit          | rule                               |
//! |------------|---------------------------|------------------------------------|
//! | procedural | top-level function        | same name replaces, new appends    |
//! | class      | member (kind and name)    | same name replaces, new appends    |
//! | YAML       | any value                 | lossless union, conflicts fail     |
//! | text       | whole file                | existing file wins                 |
//!
//! Numbered update functions are not appended but inserted after the highest
//! lower-numbered update, so updates stay in numeric order.

use hookwright_core::util::load_yaml;
use hookwright_generators::{Artifact, ArtifactBody, YamlDocument};
use hookwright_render::{ParsedProcedural, PhpClass, PhpScanner, ProceduralFile};
use hookwright_types::{GenerationError, GeneratorConfig, Result};
use serde_json::Value;
use tracing::{debug, trace};

/// How an assembled file relates to what was on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Final content
    pub content: String,
    /// Whether generated content was combined with existing content
    pub merged: bool,
}

/// Merge an assembled file with its existing counterpart.
pub fn merge_with_existing(
    artifact: &Artifact,
    existing: &str,
    scanner: &PhpScanner,
    config: &GeneratorConfig,
) -> Result<MergeOutcome> {
    debug!(path = %artifact.path, "Merging with existing file");
    let content = match &artifact.body {
        ArtifactBody::Procedural(file) => merge_procedural(&artifact.path, file, existing, scanner)?,
        ArtifactBody::Class(class) => merge_class(&artifact.path, class, existing, scanner)?,
        ArtifactBody::Yaml(document) => merge_yaml(&artifact.path, document, existing, config)?,
        ArtifactBody::Text(_) => {
            return Ok(MergeOutcome {
                content: existing.to_string(),
                merged: false,
            })
        }
    };
    Ok(MergeOutcome { content, merged: true })
}

/// `(prefix, number)` of a function named `{module}_update_{N}`.
fn update_number(name: &str) -> Option<(&str, u32)> {
    let (module, number) = name.rsplit_once("_update_")?;
    if module.is_empty() || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((module, number.parse().ok()?))
}

/// The existing update function with the highest number below `number`.
fn preceding_update(parsed: &ParsedProcedural, module: &str, number: u32) -> Option<String> {
    parsed
        .function_names()
        .into_iter()
        .filter_map(|name| match update_number(name) {
            Some((m, n)) if m == module && n < number => Some((n, name)),
            _ => None,
        })
        .max_by_key(|(n, _)| *n)
        .map(|(_, name)| name.to_string())
}

fn merge_procedural(path: &str, file: &ProceduralFile, existing: &str, scanner: &PhpScanner) -> Result<String> {
    let mut parsed = scanner.parse_procedural(path, existing)?;
    let uses: Vec<String> = file.uses.iter().cloned().collect();
    parsed.add_uses(&uses);

    for function in &file.functions {
        if parsed.replace_function(function.clone()) {
            trace!(path, function = %function.name, "Replaced function");
            continue;
        }
        let anchor = update_number(&function.name)
            .and_then(|(module, number)| preceding_update(&parsed, module, number));
        match anchor {
            Some(anchor) => {
                trace!(path, function = %function.name, after = %anchor, "Inserted update function");
                parsed.insert_after(&anchor, function.clone());
            }
            None => {
                trace!(path, function = %function.name, "Appended function");
                parsed.append(function.clone());
            }
        }
    }
    Ok(parsed.render())
}

fn merge_class(path: &str, class: &PhpClass, existing: &str, scanner: &PhpScanner) -> Result<String> {
    let mut parsed = scanner.parse_class(path, existing)?;
    let uses: Vec<String> = class.uses.iter().cloned().collect();
    parsed.add_uses(&uses);

    for member in class.ordered_members() {
        match parsed.find(member.kind, &member.name) {
            Some(index) => parsed.members[index] = member.clone(),
            None => parsed.members.push(member.clone()),
        }
    }
    Ok(parsed.render())
}

fn merge_yaml(path: &str, document: &YamlDocument, existing: &str, config: &GeneratorConfig) -> Result<String> {
    let current = match load_yaml(existing) {
        Ok(Value::Null) => Value::Object(Default::default()),
        Ok(value) => value,
        Err(e) => {
            return Err(GenerationError::ExistingCode {
                path: path.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mut merged = YamlDocument::new(document.inline_level, document.blank_line_depth);
    merged.add_existing(current).map_err(|loss| located(path, loss))?;
    merged.add_document(document).map_err(|loss| located(path, loss))?;
    Ok(merged.render(config.yaml_inline_level))
}

/// Prefix a data-loss path with the file it happened in.
fn located(path: &str, mut loss: hookwright_types::DataLossError) -> GenerationError {
    loss.path = if loss.path.is_empty() {
        path.to_string()
    } else {
        format!("{}:{}", path, loss.path)
    };
    loss.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwright_render::{Docblock, PhpFunction};
    use hookwright_types::ComponentId;

    fn artifact(path: &str, body: ArtifactBody) -> Artifact {
        Artifact {
            path: path.to_string(),
            body,
            owner: ComponentId::from("test:owner"),
            contributors: Vec::new(),
        }
    }

    fn function(name: &str) -> PhpFunction {
        PhpFunction::new(
            name,
            Docblock::new("Generated."),
            &format!("function {}()", name),
            &["return TRUE;".to_string()],
        )
    }

    #[test]
    fn test_update_number() {
        assert_eq!(update_number("test_module_update_8003"), Some(("test_module", 8003)));
        assert_eq!(update_number("test_module_update_dependencies"), None);
        assert_eq!(update_number("test_module_install"), None);
    }

    #[test]
    fn test_existing_function_replaced_others_kept() {
        let existing = "<?php\n\n/**\n * Old.\n */\nfunction test_module_help() {\n  return 'old';\n}\n\n\
                        function test_module_helper() {\n  return 1;\n}\n";
        let mut file = ProceduralFile::new("Hooks.");
        file.add_function(function("test_module_help"));
        file.add_function(function("test_module_cron"));

        let scanner = PhpScanner::new().unwrap();
        let outcome = merge_with_existing(
            &artifact("test_module.module", ArtifactBody::Procedural(file)),
            existing,
            &scanner,
            &GeneratorConfig::default(),
        )
        .unwrap();

        assert!(outcome.merged);
        let text = outcome.content;
        assert!(!text.contains("return 'old';"));
        assert!(text.contains("function test_module_helper() {\n  return 1;\n}"));
        let help = text.find("function test_module_help()").unwrap();
        let helper = text.find("function test_module_helper()").unwrap();
        let cron = text.find("function test_module_cron()").unwrap();
        assert!(help < helper && helper < cron);
    }

    #[test]
    fn test_class_members_replaced_and_appended() {
        let existing = "<?php\n\nnamespace Drupal\\test_module;\n\nuse Drupal\\Core\\Foo;\n\n\
                        class Alpha {\n\n  public function custom() {\n    return 1;\n  }\n\n  \
                        public function build() {\n    return [];\n  }\n\n}\n";
        let mut class = PhpClass::new("Drupal\\test_module", "Alpha");
        class.import("Drupal\\Core\\Bar");
        class.add_member(hookwright_render::ClassMember::method(
            "build",
            Docblock::new("{@inheritdoc}"),
            "public function build()",
            &["return ['#markup' => 'new'];".to_string()],
        ));
        class.add_member(hookwright_render::ClassMember::method(
            "extra",
            Docblock::new("Extra."),
            "public function extra()",
            &[],
        ));

        let scanner = PhpScanner::new().unwrap();
        let outcome = merge_with_existing(
            &artifact("src/Alpha.php", ArtifactBody::Class(class)),
            existing,
            &scanner,
            &GeneratorConfig::default(),
        )
        .unwrap();

        let text = outcome.content;
        assert!(text.contains("use Drupal\\Core\\Foo;\nuse Drupal\\Core\\Bar;\n"));
        assert!(text.contains("    return ['#markup' => 'new'];"));
        assert!(!text.contains("    return [];"));
        let custom = text.find("function custom()").unwrap();
        let build = text.find("function build()").unwrap();
        let extra = text.find("function extra()").unwrap();
        assert!(custom < build && build < extra);
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_yaml_union_and_conflict() {
        let mut document = YamlDocument::new(None, Some(0));
        document
            .add("permission:test_module:b", serde_json::json!({"administer beta": {"title": "Administer beta"}}))
            .unwrap();
        let scanner = PhpScanner::new().unwrap();
        let config = GeneratorConfig::default();

        let existing = "# Hand-written.\nadminister alpha:\n  title: 'Administer alpha'\n";
        let outcome = merge_with_existing(
            &artifact("test_module.permissions.yml", ArtifactBody::Yaml(document.clone())),
            existing,
            &scanner,
            &config,
        )
        .unwrap();
        assert_eq!(
            outcome.content,
            "'administer alpha':\n  title: 'Administer alpha'\n\n'administer beta':\n  title: 'Administer beta'\n"
        );

        let conflicting = "administer beta:\n  title: 'Something else'\n";
        let err = merge_with_existing(
            &artifact("test_module.permissions.yml", ArtifactBody::Yaml(document)),
            conflicting,
            &scanner,
            &config,
        )
        .unwrap_err();
        match err {
            GenerationError::DataLoss(loss) => {
                assert!(loss.path.starts_with("test_module.permissions.yml:"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_existing_text_wins() {
        let scanner = PhpScanner::new().unwrap();
        let outcome = merge_with_existing(
            &artifact("README.md", ArtifactBody::Text("generated".to_string())),
            "hand-written",
            &scanner,
            &GeneratorConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome.content, "hand-written");
        assert!(!outcome.merged);
    }

    #[test]
    fn test_unparseable_yaml_is_existing_code_error() {
        let scanner = PhpScanner::new().unwrap();
        let err = merge_with_existing(
            &artifact("a.yml", ArtifactBody::Yaml(YamlDocument::new(None, None))),
            "key: [unclosed",
            &scanner,
            &GeneratorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::ExistingCode { .. }));
    }
}
