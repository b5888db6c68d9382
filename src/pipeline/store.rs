//! Path-keyed file summaries, written once per path

use crate::utils::errors::DocError;
use crate::Result;
use indexmap::IndexMap;

/// File summaries keyed by relative path, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryStore {
    entries: IndexMap<String, String>,
}

impl SummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the summary for a path; a second write for the same path is an error
    pub fn insert<P, S>(&mut self, path: P, summary: S) -> Result<()>
    where
        P: Into<String>,
        S: Into<String>,
    {
        let path = path.into();
        if self.entries.contains_key(&path) {
            return Err(DocError::store(format!("summary for '{}' was already recorded", path)));
        }
        self.entries.insert(path, summary.into());
        Ok(())
    }

    /// On-demand lookup of one file's summary
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(path, summary)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(path, summary)| (path.as_str(), summary.as_str()))
    }
}
