//! The generation pipeline.
//!
//! One run goes through four phases:
//!
//! 1. **Collect**: resolve the root request into a component collection
//! 2. **Contain**: assemble the containment tree, after which the
//!    collection is read-only
//! 3. **Assemble**: walk the tree and let every generator contribute to files
//! 4. **Merge**: combine assembled files with any existing extension files

use crate::assembly::assemble;
use crate::collection::ComponentCollection;
use crate::collector::Collector;
use crate::gatherer::Gatherer;
use crate::merge::merge_with_existing;
use crate::output::{GeneratedFile, GenerationResult};
use hookwright_data::PropertySummary;
use hookwright_generators::{BuildContext, GeneratorRegistry, StaticMetadata};
use hookwright_render::PhpScanner;
use hookwright_types::{ExtensionReader, GeneratorConfig, MetadataSource, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs requests through every phase of generation.
///
/// A pipeline is reusable. Schemas are cached between runs.
pub struct Pipeline {
    gatherer: Gatherer,
    metadata: Box<dyn MetadataSource>,
    config: GeneratorConfig,
    scanner: PhpScanner,
}

impl Pipeline {
    /// A pipeline with every standard component type and the built-in
    /// metadata tables.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            gatherer: Gatherer::new(Arc::new(GeneratorRegistry::standard())),
            metadata: Box::new(StaticMetadata::builtin()?),
            config,
            scanner: PhpScanner::new()?,
        })
    }

    /// Use different metadata tables.
    pub fn with_metadata(mut self, metadata: Box<dyn MetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Use a different set of component types.
    pub fn with_registry(mut self, registry: Arc<GeneratorRegistry>) -> Self {
        self.gatherer = Gatherer::new(registry);
        self
    }

    /// Component types known to this pipeline.
    pub fn registry(&self) -> &GeneratorRegistry {
        self.gatherer.registry()
    }

    /// Metadata tables in use.
    pub fn metadata(&self) -> &dyn MetadataSource {
        self.metadata.as_ref()
    }

    /// Generator configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Property summary of a component type, as a UI would present it.
    pub fn schema(&self, component_type: &str) -> Result<IndexMap<String, PropertySummary>> {
        self.gatherer.summary(component_type, Some(self.metadata.as_ref()))
    }

    /// Resolve a request and fix its containment tree.
    pub fn collect(&self, component_type: &str, data: Value) -> Result<ComponentCollection> {
        let collector = Collector::new(&self.gatherer, self.metadata.as_ref(), &self.config);
        let mut collection = collector.collect(component_type, data)?;
        collection.assemble_containment_tree()?;
        Ok(collection)
    }

    /// Generate every file for a request.
    ///
    /// When `existing` is given, files that already exist are merged with
    /// the generated content instead of being replaced.
    pub fn generate(
        &self,
        component_type: &str,
        data: Value,
        existing: Option<&dyn ExtensionReader>,
    ) -> Result<GenerationResult> {
        info!(component_type, "Phase 1/4: collecting components");
        let collection = self.collect(component_type, data)?;
        info!(components = collection.len(), "Phase 2/4: containment assembled");

        info!("Phase 3/4: assembling files");
        let mut ctx = BuildContext::new(&self.config, self.metadata.as_ref(), &self.scanner);
        if let Some(reader) = existing {
            ctx = ctx.with_existing(reader);
        }
        assemble(&collection, &mut ctx)?;
        let artifacts = ctx.into_artifacts();

        info!(files = artifacts.len(), "Phase 4/4: merging with existing files");
        let mut files = IndexMap::new();
        for (path, artifact) in artifacts {
            let file_type = artifact.file_type();
            let current = existing.and_then(|reader| reader.read(&path));
            let file = match current {
                Some(current) => {
                    let outcome = merge_with_existing(&artifact, current, &self.scanner, &self.config)?;
                    GeneratedFile::new(path.clone(), outcome.content, file_type).existing(outcome.merged)
                }
                None => GeneratedFile::new(path.clone(), artifact.render(&self.config), file_type),
            };
            debug!(path = %file.path, merged = file.merged, "Generated file");
            files.insert(path, file);
        }

        info!(files = files.len(), "Generation complete");
        Ok(GenerationResult {
            files,
            components: collection.ids().cloned().collect(),
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("component_types", &self.registry().names())
            .field("config", &self.config)
            .finish()
    }
}
