//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use crate::CoreVersion;

/// Typed generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Target framework major version
    #[serde(default)]
    pub core_version: CoreVersion,

    /// Column at which docblock paragraphs wrap
    #[serde(default = "default_docblock_width")]
    pub docblock_width: usize,

    /// Override for the YAML inline level of every generated YAML file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml_inline_level: Option<usize>,

    /// Log configurations
    #[serde(default)]
    pub logs: Vec<LogConfig>,
}

fn default_docblock_width() -> usize {
    80
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            core_version: CoreVersion::default(),
            docblock_width: default_docblock_width(),
            yaml_inline_level: None,
            logs: Vec::new(),
        }
    }
}

/// Log configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level for this output
    pub level: crate::LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}
