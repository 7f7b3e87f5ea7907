//! Error types for hookwright operations.
//!
//! Three kinds of failure are kept apart at the type level:
//!
//! - [`InputError`]: a user-supplied value is invalid, or names something the
//!   metadata tables do not know about. Callers report it and let the user
//!   fix the request.
//! - [`DataLossError`]: a merge could only proceed by discarding a value.
//! - [`LogicError`]: a contract violation inside the engine or in generator
//!   metadata (duplicate identifiers, wrong phase ordering). Never retried.
//!
//! [`GenerationError`] wraps all of them for code that just needs `?`.

use serde_json::Value;
use thiserror::Error;

/// A user-supplied value failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid input at '{path}': {reason}")]
pub struct InputError {
    /// Slash-separated property path of the offending value
    pub path: String,
    /// Human-readable reason
    pub reason: String,
}

impl InputError {
    /// Create a new input error.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A merge would have had to discard information.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Merge would lose data at '{path}': existing value {existing} conflicts with {incoming}")]
pub struct DataLossError {
    /// Path of the conflicting value
    pub path: String,
    /// Value already present
    pub existing: Value,
    /// Value that could not be merged in
    pub incoming: Value,
}

impl DataLossError {
    /// Create a new data-loss error.
    pub fn new(path: impl Into<String>, existing: Value, incoming: Value) -> Self {
        Self {
            path: path.into(),
            existing,
            incoming,
        }
    }
}

/// Sequencing or metadata defects in the component collection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogicError {
    /// Two non-mergeable request paths produced the same identifier
    #[error("Unique ID '{id}' already in use by a different request path: '{existing_path}' and '{new_path}' ({reason})")]
    DuplicateId {
        /// The colliding identifier
        id: String,
        /// Request path of the component already in the collection
        existing_path: String,
        /// Request path of the incoming request
        new_path: String,
        /// Why the two could not be unified
        reason: String,
    },

    /// A component was added after the containment tree was assembled
    #[error("Component collection is locked; cannot add '{0}' after the containment tree was assembled")]
    CollectionLocked(String),

    /// The containment tree was queried before it was assembled
    #[error("Containment tree has not been assembled yet")]
    ContainmentNotAssembled,

    /// The containment tree was assembled twice
    #[error("Containment tree has already been assembled")]
    ContainmentAlreadyAssembled,

    /// A requester lookup was made on the root component
    #[error("Component '{0}' is the root and has no requesting component")]
    RootHasNoRequester(String),

    /// A containment expression could not be resolved
    #[error("Cannot resolve containment for '{id}': {reason}")]
    UnresolvedContainment {
        /// Component whose location failed
        id: String,
        /// Which step failed
        reason: String,
    },

    /// An identifier is not part of the collection
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    /// A component type is not registered
    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    /// Two components claimed the same output file incompatibly
    #[error("Conflicting contributions to '{path}': {reason}")]
    ArtifactConflict {
        /// Output file path
        path: String,
        /// What conflicted
        reason: String,
    },

    /// A default value expression refers back to itself
    #[error("Default values form a cycle at '{0}'")]
    DefaultCycle(String),
}

/// The main error type for hookwright operations.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Invalid user input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Merge data loss
    #[error(transparent)]
    DataLoss(#[from] DataLossError),

    /// Engine contract violation
    #[error("Bug detected: {0}\n\nThis is an internal error in generator metadata or engine sequencing.")]
    Logic(#[from] LogicError),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Existing code could not be read or understood
    #[error("Cannot use existing file '{path}': {reason}")]
    ExistingCode {
        /// File path relative to the extension
        path: String,
        /// What went wrong
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    /// Whether the error was caused by the request or the existing code,
    /// as opposed to a defect in the engine.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GenerationError::Input(_)
                | GenerationError::DataLoss(_)
                | GenerationError::ExistingCode { .. }
        )
    }
}

/// A specialized Result type for hookwright operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Return early with an [`InputError`] converted into the caller's error type.
///
/// # Example
///
/// ```ignore
/// if !valid {
///     input_error!("hooks/0", "Unknown hook '{}'", name);
/// }
/// ```
#[macro_export]
macro_rules! input_error {
    ($path:expr, $msg:expr) => {
        return Err($crate::InputError::new($path, $msg).into())
    };
    ($path:expr, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::InputError::new($path, format!($fmt, $($arg)*)).into())
    };
}

/// Return early with a [`LogicError`] converted into the caller's error type.
#[macro_export]
macro_rules! logic_error {
    ($err:expr) => {
        return Err($crate::LogicError::from($err).into())
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_errors_are_distinguished() {
        let input: GenerationError = InputError::new("hooks/0", "unknown hook").into();
        assert!(input.is_user_error());

        let loss: GenerationError =
            DataLossError::new("alpha", json!("value"), json!("value 2")).into();
        assert!(loss.is_user_error());

        let logic: GenerationError = LogicError::ContainmentNotAssembled.into();
        assert!(!logic.is_user_error());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = DataLossError::new("alpha", json!("value"), json!("value 2"));
        let msg = err.to_string();
        assert!(msg.contains("alpha"));
        assert!(msg.contains("value 2"));

        let err = InputError::new("plugins/0/plugin_type", "Unknown plugin type 'nope'");
        assert_eq!(
            err.to_string(),
            "Invalid input at 'plugins/0/plugin_type': Unknown plugin type 'nope'"
        );
    }

    #[test]
    fn test_input_error_macro() {
        fn check(name: &str) -> Result<()> {
            if name.is_empty() {
                input_error!("root_name", "must not be empty");
            }
            Ok(())
        }

        assert!(check("ok").is_ok());
        assert!(matches!(check(""), Err(GenerationError::Input(_))));
    }
}
