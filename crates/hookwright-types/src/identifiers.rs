//! Type-safe identifiers and version types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{GenerationError, InputError, Result};

/// A validated extension machine name.
///
/// Machine names must:
/// - Start with a lowercase letter
/// - Contain only lowercase letters, digits, and underscores
///
/// # Example
///
/// ```
/// use hookwright_types::MachineName;
///
/// let name = MachineName::new("test_module").unwrap();
/// assert_eq!(name.as_str(), "test_module");
///
/// // Invalid names are rejected
/// assert!(MachineName::new("Test-Module").is_err());
/// assert!(MachineName::new("_private").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineName(String);

impl MachineName {
    /// Create a new validated machine name.
    ///
    /// # Errors
    ///
    /// Returns an input error if the name doesn't meet validation requirements.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Self::is_valid(name) {
            return Err(InputError::new(
                "root_name",
                format!(
                    "Invalid machine name '{}': must start with a lowercase letter and contain \
                    only lowercase letters, digits, and underscores",
                    name
                ),
            )
            .into());
        }
        Ok(Self(name.to_string()))
    }

    /// Check if a name is valid without allocating.
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() => {}
            _ => return false,
        }

        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MachineName {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Identifier of one generator instance within a generation run.
///
/// Built from the component type, the machine name of the root component the
/// instance belongs to, and an optional discriminator for types that can occur
/// more than once.
///
/// # Example
///
/// ```
/// use hookwright_types::ComponentId;
///
/// let id = ComponentId::new("code_file", "test_module", Some("test_module.install"));
/// assert_eq!(id.as_str(), "code_file:test_module:test_module.install");
/// assert_eq!(id.component_type(), "code_file");
///
/// let singleton = ComponentId::new("info_file", "test_module", None);
/// assert_eq!(singleton.to_string(), "info_file:test_module");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Build an identifier from its parts.
    pub fn new(component_type: &str, root_name: &str, discriminator: Option<&str>) -> Self {
        match discriminator {
            Some(key) => Self(format!("{}:{}:{}", component_type, root_name, key)),
            None => Self(format!("{}:{}", component_type, root_name)),
        }
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The component type part of the identifier.
    pub fn component_type(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Major version of the target framework.
///
/// # Example
///
/// ```
/// use hookwright_types::CoreVersion;
///
/// let core: CoreVersion = "10".parse().unwrap();
/// assert!(core.uses_attributes());
/// assert_eq!(core.first_update_number(), 10001);
/// assert_eq!(core.version_requirement(), "^10");
///
/// assert!("7".parse::<CoreVersion>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CoreVersion(u32);

impl CoreVersion {
    /// Oldest supported major version.
    pub const MIN: u32 = 8;
    /// Newest supported major version.
    pub const MAX: u32 = 11;

    /// Create a validated core version.
    pub fn new(major: u32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&major) {
            return Err(GenerationError::Config(format!(
                "Unsupported core version {}: expected {} to {}",
                major,
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(major))
    }

    /// The major version number.
    pub fn major(&self) -> u32 {
        self.0
    }

    /// Whether plugins are declared with PHP attributes rather than annotations.
    pub fn uses_attributes(&self) -> bool {
        self.0 >= 10
    }

    /// The first `hook_update_N` number for a fresh extension.
    pub fn first_update_number(&self) -> u32 {
        self.0 * 1000 + 1
    }

    /// The `core_version_requirement` info file value.
    pub fn version_requirement(&self) -> String {
        match self.0 {
            8 => "^8 || ^9".to_string(),
            major => format!("^{}", major),
        }
    }
}

impl Default for CoreVersion {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for CoreVersion {
    type Error = GenerationError;

    fn try_from(major: u32) -> Result<Self> {
        Self::new(major)
    }
}

impl From<CoreVersion> for u32 {
    fn from(version: CoreVersion) -> u32 {
        version.0
    }
}

impl FromStr for CoreVersion {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        let major = s
            .trim()
            .split('.')
            .next()
            .and_then(|m| m.parse().ok())
            .ok_or_else(|| GenerationError::Config(format!("Invalid core version: {}", s)))?;
        Self::new(major)
    }
}

impl fmt::Display for CoreVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
