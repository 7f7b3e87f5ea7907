//! Read access to an extension that already exists.

use hookwright_core::util::fs::normalize_relative;
use hookwright_types::{ExtensionReader, GenerationError, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// File extensions the merge phase may need.
const EXTENSIONS: &[&str] = &[
    "php", "module", "install", "inc", "theme", "profile", "engine", "yml", "yaml", "css", "js", "md", "txt",
];

/// Directories never read.
const SKIPPED_DIRECTORIES: &[&str] = &["vendor", "node_modules"];

/// The files of an existing extension, read fully up front.
#[derive(Debug, Clone, Default)]
pub struct ExistingExtension {
    root: Option<PathBuf>,
    files: IndexMap<String, String>,
}

impl ExistingExtension {
    /// Load every relevant file below `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GenerationError::Config(format!(
                "Existing extension directory not found: {}",
                dir.display()
            )));
        }

        let mut files = IndexMap::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));
        for entry in walker {
            let entry = entry.map_err(|e| GenerationError::Io(e.into()))?;
            if !entry.file_type().is_file() || !has_known_extension(entry.path()) {
                continue;
            }
            let relative = normalize_relative(entry.path().strip_prefix(dir).unwrap_or(entry.path()));
            // A file that would be regenerated must never be treated as absent.
            let content = std::fs::read_to_string(entry.path()).map_err(|e| GenerationError::ExistingCode {
                path: relative.clone(),
                reason: e.to_string(),
            })?;
            files.insert(relative, content);
        }

        debug!(path = %dir.display(), files = files.len(), "Loaded existing extension");
        Ok(Self {
            root: Some(dir.to_path_buf()),
            files,
        })
    }

    /// An in-memory extension.
    pub fn from_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            root: None,
            files: files.into_iter().map(|(p, c)| (p.into(), c.into())).collect(),
        }
    }

    /// Directory the extension was loaded from.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ExtensionReader for ExistingExtension {
    fn read(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRECTORIES.contains(&name.as_ref()))
}

fn has_known_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| EXTENSIONS.contains(&e))
}
