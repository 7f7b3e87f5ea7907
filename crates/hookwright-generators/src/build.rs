//! The shared build context generators contribute output to.
//!
//! Every output file is an [`Artifact`] keyed by its path relative to the
//! extension root. Several components may contribute to one procedural or YAML
//! file; exactly one component declares each class file, after which the
//! components it contains may add members to it.

use hookwright_data::merge_values;
use hookwright_render::{Docblock, ParsedProcedural, PhpClass, PhpScanner, ProceduralFile, YamlWriter};
use hookwright_types::{
    ComponentId, DataLossError, ExtensionReader, FileType, GenerationError, GeneratorConfig, LogicError,
    MetadataSource, Result,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

/// The component currently contributing, and where its root lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScope {
    /// Contributing component
    pub id: ComponentId,
    /// Directory of the nearest root component, relative to the top root
    pub base_path: String,
    /// Machine name of the nearest root component
    pub root_name: String,
    /// Human-readable name of the nearest root component
    pub root_label: String,
}

/// A structured YAML document built from several components' entries.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlDocument {
    /// Merged content
    pub value: Value,
    /// Originating component of each entry at the blank-line depth
    origins: IndexMap<String, String>,
    /// Default inline level for this file
    pub inline_level: Option<usize>,
    /// Depth at which entries from different components are separated
    pub blank_line_depth: Option<usize>,
}

impl YamlDocument {
    /// An empty document.
    pub fn new(inline_level: Option<usize>, blank_line_depth: Option<usize>) -> Self {
        Self {
            value: Value::Object(Default::default()),
            origins: IndexMap::new(),
            inline_level,
            blank_line_depth,
        }
    }

    /// Merge in an entry. Conflicting scalars are a data loss.
    pub fn add(&mut self, origin: &str, value: Value) -> std::result::Result<bool, DataLossError> {
        if let Some(depth) = self.blank_line_depth {
            record_origins(&value, depth, &mut Vec::new(), origin, &mut self.origins);
        }
        merge_values(&mut self.value, &value, "")
    }

    /// Merge in content read from disk. Each of its entries counts as its own
    /// origin, so existing entries stay separated the way they were written.
    pub fn add_existing(&mut self, value: Value) -> std::result::Result<bool, DataLossError> {
        if let Some(depth) = self.blank_line_depth {
            let mut entries = IndexMap::new();
            record_origins(&value, depth, &mut Vec::new(), "", &mut entries);
            for path in entries.into_keys() {
                let origin = format!("existing:{}", path);
                self.origins.entry(path).or_insert(origin);
            }
        }
        merge_values(&mut self.value, &value, "")
    }

    /// Merge another document into this one, keeping its entry origins.
    pub fn add_document(&mut self, other: &YamlDocument) -> std::result::Result<bool, DataLossError> {
        for (path, origin) in &other.origins {
            self.origins.entry(path.clone()).or_insert_with(|| origin.clone());
        }
        merge_values(&mut self.value, &other.value, "")
    }

    /// Entry origins keyed by slash-joined key path.
    pub fn origins(&self) -> &IndexMap<String, String> {
        &self.origins
    }

    /// Render with the document's style, or the configured inline override.
    pub fn render(&self, inline_override: Option<usize>) -> String {
        let mut writer = YamlWriter::new().maybe_inline_level(inline_override.or(self.inline_level));
        if let Some(depth) = self.blank_line_depth {
            writer = writer.blank_lines_at(depth);
        }
        writer.render_with_origins(&self.value, &self.origins)
    }
}

fn record_origins(
    value: &Value,
    depth: usize,
    path: &mut Vec<String>,
    origin: &str,
    origins: &mut IndexMap<String, String>,
) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, child) in map {
        path.push(key.clone());
        if path.len() == depth + 1 {
            origins.entry(path.join("/")).or_insert_with(|| origin.to_string());
        } else {
            record_origins(child, depth, path, origin, origins);
        }
        path.pop();
    }
}

/// Content of one output file.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBody {
    /// Procedural PHP
    Procedural(ProceduralFile),
    /// A PHP class
    Class(PhpClass),
    /// Structured YAML
    Yaml(YamlDocument),
    /// Verbatim text
    Text(String),
}

/// One logical output file accumulating contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Path relative to the extension root
    pub path: String,
    /// Structured content
    pub body: ArtifactBody,
    /// Component that created the file
    pub owner: ComponentId,
    /// Every component that contributed, in order
    pub contributors: Vec<ComponentId>,
}

impl Artifact {
    /// File type by body.
    pub fn file_type(&self) -> FileType {
        match self.body {
            ArtifactBody::Procedural(_) => FileType::Procedural,
            ArtifactBody::Class(_) => FileType::PhpClass,
            ArtifactBody::Yaml(_) => FileType::Yaml,
            ArtifactBody::Text(_) => FileType::Text,
        }
    }

    /// Render to text.
    pub fn render(&self, config: &GeneratorConfig) -> String {
        match &self.body {
            ArtifactBody::Procedural(file) => file.render(),
            ArtifactBody::Class(class) => class.render(),
            ArtifactBody::Yaml(doc) => doc.render(config.yaml_inline_level),
            ArtifactBody::Text(text) => text.clone(),
        }
    }
}

/// Contribution target handed to [`crate::Generator::contribute`].
pub struct BuildContext<'a> {
    config: &'a GeneratorConfig,
    metadata: &'a dyn MetadataSource,
    scanner: &'a PhpScanner,
    existing: Option<&'a dyn ExtensionReader>,
    artifacts: IndexMap<String, Artifact>,
    scope: Option<ComponentScope>,
}

impl<'a> BuildContext<'a> {
    /// A context with no files yet.
    pub fn new(config: &'a GeneratorConfig, metadata: &'a dyn MetadataSource, scanner: &'a PhpScanner) -> Self {
        Self {
            config,
            metadata,
            scanner,
            existing: None,
            artifacts: IndexMap::new(),
            scope: None,
        }
    }

    /// Give generators read access to an existing extension.
    pub fn with_existing(mut self, existing: &'a dyn ExtensionReader) -> Self {
        self.existing = Some(existing);
        self
    }

    /// Make `scope` the contributing component.
    pub fn enter(&mut self, scope: ComponentScope) {
        self.scope = Some(scope);
    }

    fn scope(&self) -> Result<&ComponentScope> {
        self.scope
            .as_ref()
            .ok_or_else(|| LogicError::UnknownComponent("<no contributing component>".to_string()).into())
    }

    /// Generator configuration.
    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    /// Metadata tables.
    pub fn metadata(&self) -> &'a dyn MetadataSource {
        self.metadata
    }

    /// Machine name of the nearest root.
    pub fn root_name(&self) -> Result<String> {
        Ok(self.scope()?.root_name.clone())
    }

    /// Label of the nearest root.
    pub fn root_label(&self) -> Result<String> {
        Ok(self.scope()?.root_label.clone())
    }

    /// A docblock wrapped at the configured width.
    pub fn docblock(&self, summary: impl Into<String>) -> Docblock {
        Docblock::new(summary).width(self.config.docblock_width)
    }

    /// Path of `relative` below the nearest root.
    pub fn path(&self, relative: &str) -> Result<String> {
        let base = &self.scope()?.base_path;
        Ok(if base.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", base, relative)
        })
    }

    fn artifact(&mut self, relative: &str, create: impl FnOnce() -> ArtifactBody) -> Result<&mut Artifact> {
        let scope = self.scope()?.clone();
        let path = self.path(relative)?;
        let artifact = self.artifacts.entry(path.clone()).or_insert_with(|| {
            trace!(path = %path, owner = %scope.id, "Creating artifact");
            Artifact {
                path,
                body: create(),
                owner: scope.id.clone(),
                contributors: Vec::new(),
            }
        });
        if !artifact.contributors.contains(&scope.id) {
            artifact.contributors.push(scope.id);
        }
        Ok(artifact)
    }

    fn mismatch(path: &str, expected: &str) -> GenerationError {
        LogicError::ArtifactConflict {
            path: path.to_string(),
            reason: format!("file is not a {}", expected),
        }
        .into()
    }

    /// A procedural file, created with `description` if absent.
    pub fn procedural(&mut self, relative: &str, description: &str) -> Result<&mut ProceduralFile> {
        let artifact = self.artifact(relative, || ArtifactBody::Procedural(ProceduralFile::new(description)))?;
        match &mut artifact.body {
            ArtifactBody::Procedural(file) => Ok(file),
            _ => Err(Self::mismatch(&artifact.path, "procedural file")),
        }
    }

    /// Declare the class file this component structurally is.
    pub fn declare_class(&mut self, relative: &str, class: PhpClass) -> Result<()> {
        let path = self.path(relative)?;
        if let Some(existing) = self.artifacts.get(&path) {
            return Err(LogicError::ArtifactConflict {
                path,
                reason: format!("class already declared by '{}'", existing.owner),
            }
            .into());
        }
        self.artifact(relative, || ArtifactBody::Class(class))?;
        Ok(())
    }

    /// A class declared earlier, for adding members.
    pub fn class_mut(&mut self, relative: &str) -> Result<&mut PhpClass> {
        let path = self.path(relative)?;
        if !self.artifacts.contains_key(&path) {
            return Err(LogicError::ArtifactConflict {
                path,
                reason: "class has not been declared by a containing component".to_string(),
            }
            .into());
        }
        let artifact = self.artifact(relative, || ArtifactBody::Text(String::new()))?;
        match &mut artifact.body {
            ArtifactBody::Class(class) => Ok(class),
            _ => Err(Self::mismatch(&artifact.path, "class")),
        }
    }

    /// Merge an entry into a YAML file, creating it with the given style.
    pub fn yaml(
        &mut self,
        relative: &str,
        inline_level: Option<usize>,
        blank_line_depth: Option<usize>,
        value: Value,
    ) -> Result<()> {
        let origin = self.scope()?.id.to_string();
        let artifact = self.artifact(relative, || {
            ArtifactBody::Yaml(YamlDocument::new(inline_level, blank_line_depth))
        })?;
        match &mut artifact.body {
            ArtifactBody::Yaml(doc) => {
                doc.add(&origin, value)?;
                Ok(())
            }
            _ => Err(Self::mismatch(&artifact.path, "YAML file")),
        }
    }

    /// A verbatim text file. Two components may only write identical text.
    pub fn text(&mut self, relative: &str, content: String) -> Result<()> {
        let incoming = content.clone();
        let artifact = self.artifact(relative, || ArtifactBody::Text(content))?;
        match &artifact.body {
            ArtifactBody::Text(existing) if *existing == incoming => Ok(()),
            ArtifactBody::Text(existing) => Err(DataLossError::new(
                artifact.path.clone(),
                Value::String(existing.clone()),
                Value::String(incoming),
            )
            .into()),
            _ => Err(Self::mismatch(&artifact.path, "text file")),
        }
    }

    /// Raw content of an existing file below the nearest root.
    pub fn existing_file(&self, relative: &str) -> Result<Option<&'a str>> {
        let path = self.path(relative)?;
        Ok(self.existing.and_then(|reader| reader.read(&path)))
    }

    /// An existing procedural file split into functions.
    pub fn existing_procedural(&self, relative: &str) -> Result<Option<ParsedProcedural>> {
        let path = self.path(relative)?;
        match self.existing_file(relative)? {
            Some(source) => Ok(Some(self.scanner.parse_procedural(&path, source)?)),
            None => Ok(None),
        }
    }

    /// Files assembled so far.
    pub fn artifacts(&self) -> &IndexMap<String, Artifact> {
        &self.artifacts
    }

    /// Finish and take the assembled files.
    pub fn into_artifacts(self) -> IndexMap<String, Artifact> {
        self.artifacts
    }
}
