//! Path utilities

use std::path::{Component, Path, PathBuf};

/// Extension appended to a file's name to form its summary file name
pub const SUMMARY_EXTENSION: &str = "md";

/// `path` relative to `root`, with `/` separators on every platform
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Where the summary of `relative` lives under `dir`: same layout, `.md` appended
pub fn summary_path(dir: &Path, relative: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != "." && *s != "..") {
        path.push(segment);
    }
    let file_name = path
        .file_name()
        .map(|name| format!("{}.{}", name.to_string_lossy(), SUMMARY_EXTENSION))
        .unwrap_or_else(|| format!("index.{}", SUMMARY_EXTENSION));
    path.set_file_name(file_name);
    path
}
