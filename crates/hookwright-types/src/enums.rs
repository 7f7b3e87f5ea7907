//! Common enumerations used throughout hookwright.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{GenerationError, Result};

/// Log level enumeration for the logging system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Detailed trace messages
    Trace,
}

impl LogLevel {
    /// The directive understood by `tracing-subscriber` filters.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" | "OFF" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(GenerationError::Config(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "NONE"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// Value format of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyFormat {
    /// Plain string
    #[default]
    String,
    /// True/false flag
    Boolean,
    /// Ordered list of strings; always multi-valued
    Array,
    /// Nested record with its own property definitions
    Complex,
    /// Free-form keyed data, merged recursively
    Mapping,
}

impl PropertyFormat {
    /// Whether values of this format are leaves rather than nested records.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            PropertyFormat::String | PropertyFormat::Boolean | PropertyFormat::Array
        )
    }
}

impl fmt::Display for PropertyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyFormat::String => write!(f, "string"),
            PropertyFormat::Boolean => write!(f, "boolean"),
            PropertyFormat::Array => write!(f, "array"),
            PropertyFormat::Complex => write!(f, "complex"),
            PropertyFormat::Mapping => write!(f, "mapping"),
        }
    }
}

/// Kind of output file a build artifact renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    /// Procedural PHP file made of functions (.module, .install, .inc)
    Procedural,
    /// PHP file holding exactly one class
    PhpClass,
    /// YAML document
    Yaml,
    /// Opaque text (CSS, JS, Markdown)
    Text,
}

impl FileType {
    /// Guess the file type from a path.
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit('.').next().unwrap_or("");
        match ext {
            "yml" | "yaml" => FileType::Yaml,
            "module" | "install" | "inc" | "profile" | "theme" => FileType::Procedural,
            "php" => FileType::PhpClass,
            _ => FileType::Text,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Procedural => write!(f, "procedural"),
            FileType::PhpClass => write!(f, "php-class"),
            FileType::Yaml => write!(f, "yaml"),
            FileType::Text => write!(f, "text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(FileType::from_path("test_module.info.yml"), FileType::Yaml);
        assert_eq!(FileType::from_path("test_module.tokens.inc"), FileType::Procedural);
        assert_eq!(FileType::from_path("src/Plugin/Block/Foo.php"), FileType::PhpClass);
        assert_eq!(FileType::from_path("css/test_module.css"), FileType::Text);
    }
}
