//! Hierarchical aggregation of file summaries into module and project summaries

use super::SummaryStore;
use crate::context::{Node, ProjectTree};
use crate::llm::{CompletionBackend, PromptTemplates};
use crate::utils::errors::DocError;
use crate::utils::text::first_lines;
use crate::Result;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Project summary used when no file produced a summary
pub const NO_SUMMARIES_TEXT: &str = "No file summaries were available to describe this project.";

/// Label used for the project root in logs and errors
const ROOT_LABEL: &str = "(project root)";

/// Module calls allowed in flight unless configured otherwise
const DEFAULT_MODULE_CONCURRENCY: usize = 4;

/// Post-order traversal of the project tree.
///
/// Leaves contribute `File: <path>\nSummary: <text>` fragments taken from the
/// summary store. Each directory joins its children's fragments, asks the
/// backend for a module summary and hands `Module: <path>\nSummary: <text>` to
/// its parent. The root's bare text is the project summary. Siblings are
/// aggregated concurrently; a parent starts only once all children resolved.
/// Backend calls across the whole tree share one concurrency limit, and no
/// module call starts once the cancellation token is raised.
pub struct Aggregator {
    backend: Option<Arc<dyn CompletionBackend>>,
    templates: PromptTemplates,
    fallback_lines: usize,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl Aggregator {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, templates: PromptTemplates, fallback_lines: usize) -> Self {
        Self {
            backend,
            templates,
            fallback_lines,
            permits: Arc::new(Semaphore::new(DEFAULT_MODULE_CONCURRENCY)),
            cancel: CancellationToken::new(),
        }
    }

    /// Limit module calls in flight across the whole tree
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(concurrency.max(1)));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Aggregate the whole tree.
    ///
    /// A failed module aggregation fails the run; a raised cancellation token
    /// yields [`DocError::Cancelled`].
    pub async fn project_summary(&self, tree: &ProjectTree, store: &SummaryStore) -> Result<String> {
        let summary = match tree.root() {
            Node::File { path } => store.get(path).map(str::to_string),
            Node::Directory { path, children } => self.module_text(path, children, store).await?,
        };

        Ok(summary.unwrap_or_else(|| {
            tracing::warn!("No file summaries to aggregate");
            NO_SUMMARIES_TEXT.to_string()
        }))
    }

    fn visit<'a>(&'a self, node: &'a Node, store: &'a SummaryStore) -> BoxFuture<'a, Result<Option<String>>> {
        async move {
            match node {
                Node::File { path } => Ok(store
                    .get(path)
                    .map(|summary| format!("File: {}\nSummary: {}", path, summary))),
                Node::Directory { path, children } => Ok(self
                    .module_text(path, children, store)
                    .await?
                    .map(|text| format!("Module: {}\nSummary: {}", path, text))),
            }
        }
        .boxed()
    }

    /// Bare aggregated text for a directory, or `None` when no child emitted a fragment
    async fn module_text(
        &self,
        path: &str,
        children: &BTreeMap<String, Node>,
        store: &SummaryStore,
    ) -> Result<Option<String>> {
        let fragments: Vec<String> = try_join_all(children.values().map(|child| self.visit(child, store)))
            .await?
            .into_iter()
            .flatten()
            .collect();

        let label = if path.is_empty() { ROOT_LABEL } else { path };
        if fragments.is_empty() {
            tracing::debug!("Module {} has no summarized files, skipping", label);
            return Ok(None);
        }

        let joined = fragments.join("\n\n");
        let Some(backend) = &self.backend else {
            return Ok(Some(first_lines(&joined, self.fallback_lines)));
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DocError::cancelled("module aggregation"))?;
        if self.cancel.is_cancelled() {
            tracing::debug!("Skipping module {}: run cancelled", label);
            return Err(DocError::cancelled("module aggregation"));
        }

        tracing::info!("Aggregating module {} from {} parts", label, fragments.len());
        let prompt = self.templates.module_prompt(&joined);
        match backend.complete(&prompt).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                tracing::error!("Aggregation failed for module {}: {}", label, e);
                Err(DocError::aggregation(label, e))
            }
        }
    }
}
