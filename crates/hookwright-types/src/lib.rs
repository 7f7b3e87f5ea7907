//! # Hookwright Types
//!
//! Core types, traits, and enums shared across all hookwright crates.
//!
//! This crate provides the fundamental building blocks for the hookwright
//! extension code generator, including:
//!
//! - Type-safe wrappers for machine names, component identifiers, and the
//!   target framework version
//! - Common enums for property formats, file types, and log levels
//! - Collaborator traits for metadata tables and existing-code readers
//! - The error taxonomy: input errors, merge data loss, and logic errors
//!
//! ## Example
//!
//! ```
//! use hookwright_types::{ComponentId, CoreVersion, MachineName};
//!
//! let name = MachineName::new("test_module").unwrap();
//! let id = ComponentId::new("info_file", name.as_str(), None);
//! assert_eq!(id.as_str(), "info_file:test_module");
//!
//! let core = CoreVersion::new(9).unwrap();
//! assert_eq!(core.first_update_number(), 9001);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod metadata;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{DataLossError, GenerationError, InputError, LogicError, Result};
pub use identifiers::{ComponentId, CoreVersion, MachineName};
pub use enums::{FileType, LogLevel, PropertyFormat};
pub use metadata::{HookInfo, PluginMethodInfo, PluginTypeInfo, ServiceInfo};
pub use traits::{ExtensionReader, MetadataSource};
pub use config::{GeneratorConfig, LogConfig, LogFormat};
