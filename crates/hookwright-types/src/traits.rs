//! Collaborator trait definitions.

use crate::errors::{InputError, Result};
use crate::metadata::{HookInfo, PluginTypeInfo, ServiceInfo};

/// Source of hook, plugin type, and service metadata.
///
/// Implementers supply tables collected from a framework installation, or a
/// static built-in table. Generators treat a missing entry as invalid input.
pub trait MetadataSource: Send + Sync {
    /// Look up a hook by full name.
    fn hook(&self, name: &str) -> Option<&HookInfo>;

    /// All known hooks, in table order.
    fn hooks(&self) -> Vec<&HookInfo>;

    /// Look up a plugin type by id.
    fn plugin_type(&self, id: &str) -> Option<&PluginTypeInfo>;

    /// All known plugin types.
    fn plugin_types(&self) -> Vec<&PluginTypeInfo>;

    /// Look up a service by id.
    fn service(&self, id: &str) -> Option<&ServiceInfo>;

    /// All known services.
    fn services(&self) -> Vec<&ServiceInfo>;

    /// Look up a hook, reporting absence as an input error at `path`.
    fn require_hook(&self, name: &str, path: &str) -> Result<&HookInfo> {
        self.hook(name)
            .ok_or_else(|| InputError::new(path, format!("Unknown hook '{}'", name)).into())
    }

    /// Look up a plugin type, reporting absence as an input error at `path`.
    fn require_plugin_type(&self, id: &str, path: &str) -> Result<&PluginTypeInfo> {
        self.plugin_type(id)
            .ok_or_else(|| InputError::new(path, format!("Unknown plugin type '{}'", id)).into())
    }

    /// Look up a service, reporting absence as an input error at `path`.
    fn require_service(&self, id: &str, path: &str) -> Result<&ServiceInfo> {
        self.service(id)
            .ok_or_else(|| InputError::new(path, format!("Unknown service '{}'", id)).into())
    }
}

/// Read access to the files of an extension that already exists on disk.
///
/// The engine only reads through this trait during the merge phase and never
/// writes; writing is the calling tool's job.
pub trait ExtensionReader: Send + Sync {
    /// Contents of the file at `path` (relative to the extension root), or
    /// `None` if it does not exist.
    fn read(&self, path: &str) -> Option<&str>;

    /// All relative paths known to exist.
    fn paths(&self) -> Vec<&str>;
}
