//! # Hookwright Generators
//!
//! Component types and the interface the engine drives them through.
//!
//! - [`Generator`]: one resolved component occurrence. It names the components
//!   it needs, where its output is contained, and contributes to files.
//! - [`GeneratorRegistry`]: component type name to schema and factory.
//! - [`BuildContext`]: the shared set of output files generators contribute to.
//! - [`StaticMetadata`]: hook, plugin type, and service tables.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod properties;

pub mod build;
pub mod components;
pub mod generator;
pub mod injection;
pub mod metadata;
pub mod registry;

pub use build::{Artifact, ArtifactBody, BuildContext, ComponentScope, YamlDocument};
pub use generator::{ContainmentLocation, ContainmentStep, Generator, Repeat, Requirement, RequirementContext};
pub use metadata::{MetadataTable, StaticMetadata};
pub use registry::{ComponentType, FactoryFn, GeneratorRegistry, SchemaFn};
