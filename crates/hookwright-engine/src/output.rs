//! Final output of a generation run.

use hookwright_types::{ComponentId, FileType};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// One file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the extension root
    pub path: String,
    /// Full content
    pub content: String,
    /// Kind of file
    pub file_type: FileType,
    /// Whether a file already existed at this path
    pub pre_existing: bool,
    /// Whether generated content was merged into the existing file
    pub merged: bool,
    /// SHA-256 of the content, hex encoded
    pub hash: String,
}

impl GeneratedFile {
    /// Create a file, hashing its content.
    pub fn new(path: impl Into<String>, content: String, file_type: FileType) -> Self {
        let hash = content_hash(&content);
        Self {
            path: path.into(),
            content,
            file_type,
            pre_existing: false,
            merged: false,
            hash,
        }
    }

    /// Mark the file as having existed before the run.
    pub fn existing(mut self, merged: bool) -> Self {
        self.pre_existing = true;
        self.merged = merged;
        self
    }

    /// Whether writing this file would leave `current` unchanged.
    pub fn is_unchanged(&self, current: &str) -> bool {
        content_hash(current) == self.hash
    }
}

/// Hex-encoded SHA-256 digest.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Everything a generation run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Files keyed by relative path, in assembly order
    pub files: IndexMap<String, GeneratedFile>,
    /// Every component in the collection, in request order
    pub components: Vec<ComponentId>,
}

impl GenerationResult {
    /// A file by relative path.
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.get(path)
    }

    /// Relative paths in assembly order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Files whose content differs from what is on disk below `dir`.
    pub fn changed_files(&self, dir: &Path) -> Vec<&GeneratedFile> {
        self.files
            .values()
            .filter(|file| match std::fs::read_to_string(dir.join(&file.path)) {
                Ok(current) => !file.is_unchanged(&current),
                Err(_) => true,
            })
            .collect()
    }

    /// Write every changed file below `dir`, creating directories as needed.
    ///
    /// Returns the relative paths written.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        let mut written = Vec::new();
        for file in self.changed_files(dir) {
            let target = dir.join(&file.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &file.content)?;
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let file = GeneratedFile::new("a.txt", "abc".to_string(), FileType::Text);
        assert_eq!(file.hash.len(), 64);
        assert!(file.is_unchanged("abc"));
        assert!(!file.is_unchanged("abd"));
    }

    #[test]
    fn test_write_skips_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("same.txt"), "same").unwrap();

        let mut result = GenerationResult::default();
        for (path, content) in [("same.txt", "same"), ("src/New.php", "<?php\n")] {
            result
                .files
                .insert(path.to_string(), GeneratedFile::new(path, content.to_string(), FileType::Text));
        }

        let written = result.write_to(dir.path()).unwrap();
        assert_eq!(written, vec!["src/New.php".to_string()]);
        assert_eq!(std::fs::read_to_string(dir.path().join("src/New.php")).unwrap(), "<?php\n");
        assert!(result.write_to(dir.path()).unwrap().is_empty());
    }
}
