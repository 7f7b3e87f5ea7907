//! # Hookwright Engine
//!
//! Turns one root request into the files of an extension:
//!
//! - [`Gatherer`]: component schemas with nested component data embedded
//! - [`Collector`]: request graph resolution with duplicate merging
//! - [`ComponentCollection`]: the resolved components and their containment
//! - [`assemble`]: contributions of every generator, in containment order
//! - [`merge_with_existing`]: combining generated and hand-written code
//! - [`Pipeline`]: all of the above in sequence
//!
//! ## Example
//!
//! ```no_run
//! use hookwright_engine::{ExistingExtension, Pipeline};
//! use hookwright_types::GeneratorConfig;
//! use serde_json::json;
//!
//! let pipeline = Pipeline::new(GeneratorConfig::default())?;
//! let existing = ExistingExtension::load("modules/test_module")?;
//! let result = pipeline.generate(
//!     "module",
//!     json!({"root_name": "test_module", "hooks": ["hook_help"]}),
//!     Some(&existing),
//! )?;
//! for path in result.paths() {
//!     println!("{}", path);
//! }
//! # Ok::<(), hookwright_types::GenerationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembly;
pub mod collection;
pub mod collector;
pub mod existing;
pub mod gatherer;
pub mod merge;
pub mod output;
pub mod pipeline;

pub use assembly::assemble;
pub use collection::{ComponentCollection, RequestEdge};
pub use collector::Collector;
pub use existing::ExistingExtension;
pub use gatherer::Gatherer;
pub use merge::{merge_with_existing, MergeOutcome};
pub use output::{content_hash, GeneratedFile, GenerationResult};
pub use pipeline::Pipeline;
