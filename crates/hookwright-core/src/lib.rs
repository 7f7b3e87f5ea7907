//! # Hookwright Core
//!
//! Core utilities, configuration management, and logging for the hookwright
//! extension code generator.
//!
//! This crate provides:
//!
//! - **Configuration**: Multi-layer configuration (defaults, file, programmatic, environment)
//! - **Logging**: `tracing` subscriber setup with level and format selection
//! - **Data**: YAML/JSON loading and path lookups
//! - **Naming**: case conversions for class, method, and label names
//!
//! ## Example
//!
//! ```no_run
//! use hookwright_core::{config::Config, log};
//!
//! let config = Config::load_default()?;
//! let generator = config.typed()?;
//! log::init_from_config(&generator.logs)?;
//! # Ok::<(), hookwright_types::GenerationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;

// Re-export commonly used items
pub use config::Config;
pub use hookwright_types::{GenerationError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "hookwright";
