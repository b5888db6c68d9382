//! Path filter: ignore rules and size limits decide which files take part

use super::FileEntry;
use crate::config::FilterConfig;
use crate::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Gitignore-style rules merged from the project's `.gitignore` and user patterns.
///
/// Later patterns override earlier ones, so a user pattern such as `!keep.log`
/// re-includes a file the `.gitignore` excluded.
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    matcher: Gitignore,
    pattern_count: usize,
}

impl IgnoreRuleSet {
    /// Build the rule set for a project root from configuration
    pub fn load(root: &Path, config: &FilterConfig) -> Result<Self> {
        let gitignore = if config.use_gitignore {
            read_gitignore(root)
        } else {
            None
        };
        Self::from_sources(root, gitignore.as_deref(), &config.ignore_patterns)
    }

    /// Build the rule set from `.gitignore` text (if any) followed by extra patterns
    pub fn from_sources(root: &Path, gitignore: Option<&str>, extra_patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0;

        let gitignore_lines = gitignore.into_iter().flat_map(str::lines);
        for line in gitignore_lines.chain(extra_patterns.iter().map(String::as_str)) {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            builder.add_line(None, line)?;
            pattern_count += 1;
        }

        Ok(Self {
            matcher: builder.build()?,
            pattern_count,
        })
    }

    /// Number of effective patterns
    pub fn len(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }

    /// Whether a root-relative file path is ignored (directory patterns apply to everything beneath)
    pub fn is_ignored(&self, relative: &str) -> bool {
        let relative = relative.trim_start_matches('/');
        self.matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}

fn read_gitignore(root: &Path) -> Option<String> {
    let path = root.join(".gitignore");
    match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No .gitignore found at {}, using configured patterns only", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Outcome of filtering one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Included,
    Ignored,
    TooLarge { size: u64 },
    Unreadable,
}

impl FilterDecision {
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Included)
    }
}

/// Decides per discovered file whether it participates in a run
#[derive(Debug, Clone)]
pub struct PathFilter {
    rules: IgnoreRuleSet,
    max_file_size: u64,
}

impl PathFilter {
    /// `max_file_size` of 0 disables the size check
    pub fn new(rules: IgnoreRuleSet, max_file_size: u64) -> Self {
        Self { rules, max_file_size }
    }

    pub fn load(root: &Path, config: &FilterConfig) -> Result<Self> {
        Ok(Self::new(IgnoreRuleSet::load(root, config)?, config.max_file_size))
    }

    pub fn rules(&self) -> &IgnoreRuleSet {
        &self.rules
    }

    /// Decide for one file; ignore rules are checked before the size limit
    pub fn decide(&self, entry: &FileEntry) -> FilterDecision {
        if self.rules.is_ignored(&entry.relative) {
            tracing::debug!("Skipping ignored file: {}", entry.relative);
            return FilterDecision::Ignored;
        }

        if self.max_file_size == 0 {
            return FilterDecision::Included;
        }

        match std::fs::metadata(&entry.absolute) {
            Ok(metadata) if metadata.len() > self.max_file_size => {
                tracing::info!(
                    "Skipping large file: {} ({} bytes, limit {})",
                    entry.relative,
                    metadata.len(),
                    self.max_file_size
                );
                FilterDecision::TooLarge { size: metadata.len() }
            }
            Ok(_) => FilterDecision::Included,
            Err(e) => {
                tracing::error!("Failed to stat {}: {}", entry.absolute.display(), e);
                FilterDecision::Unreadable
            }
        }
    }

    pub fn is_included(&self, entry: &FileEntry) -> bool {
        self.decide(entry).is_included()
    }

    /// Keep the included entries, preserving order
    pub fn apply(&self, entries: Vec<FileEntry>) -> Vec<FileEntry> {
        let total = entries.len();
        let included: Vec<_> = entries.into_iter().filter(|entry| self.is_included(entry)).collect();
        tracing::info!("{} of {} files included after filtering", included.len(), total);
        included
    }
}
