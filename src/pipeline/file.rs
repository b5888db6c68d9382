//! Per-file summaries

use crate::context::FileEntry;
use crate::llm::{CompletionBackend, PromptTemplates};
use crate::utils::text::{first_lines, truncate};
use std::sync::Arc;

/// Summary recorded for a file that could not be read
pub const UNREADABLE_PLACEHOLDER: &str = "Summary unavailable: the file could not be read.";

/// Summary recorded when the backend failed after all retries
pub fn failure_placeholder(provider: &str) -> String {
    format!("Summary unavailable: the {} backend did not return a summary.", provider)
}

/// Summary recorded when the backend is missing required configuration
pub fn configuration_placeholder(provider: &str) -> String {
    format!(
        "Summary unavailable: the {} backend is not configured (missing API key).",
        provider
    )
}

/// Renders the file prompt, calls the backend and degrades to placeholders on failure
#[derive(Clone)]
pub struct FileSummarizer {
    backend: Option<Arc<dyn CompletionBackend>>,
    templates: PromptTemplates,
    fallback_lines: usize,
}

impl FileSummarizer {
    /// With no backend, summaries are the first `fallback_lines` lines of content
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, templates: PromptTemplates, fallback_lines: usize) -> Self {
        Self {
            backend,
            templates,
            fallback_lines,
        }
    }

    /// Summarize file content; never fails
    pub async fn summarize(&self, content: &str, file_path: &str) -> String {
        let Some(backend) = &self.backend else {
            return first_lines(content, self.fallback_lines);
        };

        let prompt = self.templates.file_prompt(file_path, content);
        match backend.complete(&prompt).await {
            Ok(summary) => {
                tracing::debug!("Summarized {}: {}", file_path, truncate(&summary, 80));
                summary
            }
            Err(e) if e.is_configuration() => {
                tracing::error!("Cannot summarize {}: {}", file_path, e);
                configuration_placeholder(backend.provider_name())
            }
            Err(e) => {
                tracing::error!("Failed to summarize {}: {}", file_path, e);
                failure_placeholder(backend.provider_name())
            }
        }
    }

    /// Read a discovered file and summarize it; unreadable files get a placeholder
    pub async fn summarize_entry(&self, entry: &FileEntry) -> String {
        match tokio::fs::read_to_string(&entry.absolute).await {
            Ok(content) => self.summarize(&content, &entry.relative).await,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", entry.absolute.display(), e);
                UNREADABLE_PLACEHOLDER.to_string()
            }
        }
    }
}
