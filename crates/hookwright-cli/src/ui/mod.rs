//! Terminal output helpers.

use colored::Colorize;

/// What writing a file does to the extension directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// New file
    Create,
    /// Existing file rewritten with merged content
    Merge,
    /// Existing file replaced
    Update,
    /// Content identical to what is on disk
    Unchanged,
}

impl FileStatus {
    fn label(&self) -> String {
        let text = match self {
            FileStatus::Create => "create",
            FileStatus::Merge => "merge",
            FileStatus::Update => "update",
            FileStatus::Unchanged => "unchanged",
        };
        let padded = format!("{:>9}", text);
        match self {
            FileStatus::Create => padded.green().bold().to_string(),
            FileStatus::Merge => padded.yellow().bold().to_string(),
            FileStatus::Update => padded.cyan().bold().to_string(),
            FileStatus::Unchanged => padded.dimmed().to_string(),
        }
    }
}

/// One line per file.
pub fn file(status: FileStatus, path: &str) {
    println!("  {} {}", status.label(), path);
}

/// A completed step.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Something the user should know about.
pub fn note(message: &str) {
    println!("  {} {}", "→".yellow(), message);
}
