//! Project file discovery, selection and tree structure

use crate::utils::errors::DocError;
use crate::utils::path::relative_slash_path;
use crate::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub mod filter;
pub mod tree;

pub use filter::{IgnoreRuleSet, PathFilter};
pub use tree::{Node, ProjectTree};

/// Directories never descended into during discovery
pub const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", ".git"];

/// A discovered project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute (or root-joined) path on disk
    pub absolute: PathBuf,
    /// Path relative to the project root, `/`-separated
    pub relative: String,
}

impl FileEntry {
    pub fn new(absolute: PathBuf, relative: String) -> Self {
        Self { absolute, relative }
    }
}

/// Discover candidate files under `root`, sorted by relative path.
///
/// Ignore files are not consulted here; the [`PathFilter`] owns those rules.
pub fn discover_files(root: &Path) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        return Err(DocError::no_workspace(root));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            !(is_dir && entry.depth() > 0 && SKIPPED_DIRECTORIES.iter().any(|name| entry.file_name() == *name))
        });

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                    continue;
                }
                match relative_slash_path(root, entry.path()) {
                    Some(relative) => files.push(FileEntry::new(entry.path().to_path_buf(), relative)),
                    None => tracing::warn!("Skipping path outside project root: {}", entry.path().display()),
                }
            }
            Err(err) => {
                tracing::warn!("Failed to process file entry: {}", err);
            }
        }
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::info!("Discovered {} files in {}", files.len(), root.display());
    Ok(files)
}
