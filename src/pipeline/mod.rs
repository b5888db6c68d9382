//! Hierarchical summarization pipeline
//!
//! A run discovers and filters the project's files, builds the project tree,
//! summarizes every included file (bounded concurrency), aggregates the
//! summaries bottom-up into module and project summaries, and assembles the
//! final document.

pub mod aggregate;
pub mod document;
pub mod file;
pub mod store;

pub use aggregate::Aggregator;
pub use document::assemble_document;
pub use file::FileSummarizer;
pub use store::SummaryStore;

use crate::config::Config;
use crate::context::{discover_files, FileEntry, PathFilter, ProjectTree};
use crate::llm::{BackendFactory, CompletionBackend, PromptTemplates};
use crate::utils::errors::DocError;
use crate::Result;
use chrono::{DateTime, Utc};
use futures::{future, stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Canonical project root
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub project_summary: String,
    pub document: String,
    pub summaries: SummaryStore,
    pub tree: ProjectTree,
}

impl RunReport {
    pub fn file_count(&self) -> usize {
        self.summaries.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// How a run ended, short of an error
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The run was cancelled; collected summaries were discarded and no document was produced
    Cancelled { summarized: usize, total: usize },
}

/// Drives one documentation run with an immutable configuration
pub struct ProjectDocumenter {
    config: Arc<Config>,
    backend: Option<Arc<dyn CompletionBackend>>,
    templates: PromptTemplates,
}

impl ProjectDocumenter {
    /// Validate the configuration and build the configured backend
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = BackendFactory::create(&config)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Use an explicit backend (`None` selects the first-lines fallback)
    pub fn with_backend(config: Config, backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        let templates = PromptTemplates::from_overrides(&config.prompts);
        Self {
            config: Arc::new(config),
            backend,
            templates,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the active backend, if any
    pub fn provider_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.provider_name())
    }

    /// Discovered files that pass the path filter, in discovery order
    pub fn select_files(&self, root: &Path) -> Result<Vec<FileEntry>> {
        let discovered = discover_files(root)?;
        let output_dir = self.config.output_dir_for(root);
        let output_dir = std::fs::canonicalize(&output_dir).unwrap_or(output_dir);
        let discovered: Vec<FileEntry> = discovered
            .into_iter()
            .filter(|entry| !entry.absolute.starts_with(&output_dir))
            .collect();

        let filter = PathFilter::load(root, &self.config.filter)?;
        let selected = filter.apply(discovered);
        tracing::info!("Selected {} files ({} ignore rules)", selected.len(), filter.rules().len());
        Ok(selected)
    }

    /// Structure only: discovery, filtering and tree construction, no backend calls
    pub fn build_tree(&self, root: &Path) -> Result<ProjectTree> {
        let root = std::fs::canonicalize(root).map_err(|_| DocError::no_workspace(root))?;
        let files = self.select_files(&root)?;
        Ok(ProjectTree::build(files.iter().map(|entry| entry.relative.as_str())))
    }

    /// Run the whole pipeline for `root`.
    ///
    /// Raising `cancel` stops dispatching new files; in-flight summaries finish,
    /// then the run reports [`RunOutcome::Cancelled`] without aggregating. A
    /// cancel raised during aggregation stops further module calls and also
    /// reports [`RunOutcome::Cancelled`].
    pub async fn run(&self, root: &Path, cancel: &CancellationToken) -> Result<RunOutcome> {
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|_| DocError::no_workspace(root))?;
        if !root.is_dir() {
            return Err(DocError::no_workspace(root));
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        self.run_in(root, run_id, cancel).instrument(span).await
    }

    async fn run_in(&self, root: PathBuf, run_id: Uuid, cancel: &CancellationToken) -> Result<RunOutcome> {
        let started_at = Utc::now();
        tracing::info!("Documenting {}", root.display());

        let files = self.select_files(&root)?;
        let tree = ProjectTree::build(files.iter().map(|entry| entry.relative.as_str()));
        let total = files.len();

        let summarizer = FileSummarizer::new(
            self.backend.clone(),
            self.templates.clone(),
            self.config.run.fallback_lines,
        );
        let token = cancel.clone();
        let results: Vec<(String, String)> = stream::iter(files)
            .take_while(move |_| future::ready(!token.is_cancelled()))
            .map(|entry| {
                let summarizer = summarizer.clone();
                async move {
                    let summary = summarizer.summarize_entry(&entry).await;
                    (entry.relative, summary)
                }
            })
            .buffered(self.config.run.concurrency.max(1))
            .collect()
            .await;

        if cancel.is_cancelled() {
            tracing::warn!("Run cancelled after {} of {} files", results.len(), total);
            return Ok(RunOutcome::Cancelled {
                summarized: results.len(),
                total,
            });
        }

        let mut summaries = SummaryStore::new();
        for (path, summary) in results {
            summaries.insert(path, summary)?;
        }

        let aggregator = Aggregator::new(
            self.backend.clone(),
            self.templates.clone(),
            self.config.run.fallback_lines,
        )
        .with_concurrency(self.config.run.concurrency)
        .with_cancellation(cancel.clone());
        let project_summary = match aggregator.project_summary(&tree, &summaries).await {
            Err(DocError::Cancelled { .. }) => None,
            result => Some(result?),
        };
        let Some(project_summary) = project_summary.filter(|_| !cancel.is_cancelled()) else {
            tracing::warn!("Run cancelled during aggregation");
            return Ok(RunOutcome::Cancelled {
                summarized: summaries.len(),
                total,
            });
        };
        let document = assemble_document(summaries.iter(), &tree, &project_summary)?;

        let finished_at = Utc::now();
        tracing::info!(
            "Documented {} files in {} ms",
            summaries.len(),
            (finished_at - started_at).num_milliseconds()
        );

        Ok(RunOutcome::Completed(RunReport {
            run_id,
            root,
            started_at,
            finished_at,
            project_summary,
            document,
            summaries,
            tree,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::{DEFAULT_FILE_PROMPT, DEFAULT_MODULE_PROMPT};
    use crate::llm::test_support::ScriptedBackend;
    use crate::llm::LlmError;
    use std::collections::hash_map::DefaultHasher;
    use std::fs;
    use std::hash::{Hash, Hasher};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn role_of(prompt: &str) -> &'static str {
        if prompt.starts_with(DEFAULT_FILE_PROMPT) {
            "file"
        } else if prompt.starts_with(DEFAULT_MODULE_PROMPT) {
            "module"
        } else {
            "other"
        }
    }

    /// Echoes `<role>:<hash of prompt>`
    fn hashing_backend() -> Arc<ScriptedBackend> {
        Arc::new(ScriptedBackend::new(|prompt| {
            let mut hasher = DefaultHasher::new();
            prompt.hash(&mut hasher);
            Ok(format!("{}:{:x}", role_of(prompt), hasher.finish()))
        }))
    }

    #[tokio::test]
    async fn test_end_to_end_two_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.ts", "x");
        write(dir.path(), "README.md", "y");

        let backend = hashing_backend();
        let documenter = ProjectDocumenter::with_backend(Config::default(), Some(backend.clone()));
        let outcome = documenter.run(dir.path(), &CancellationToken::new()).await.unwrap();

        let RunOutcome::Completed(report) = outcome else {
            panic!("run should complete");
        };

        assert_eq!(report.file_count(), 2);
        let readme = report.summaries.get("README.md").unwrap();
        let source = report.summaries.get("src/a.ts").unwrap();
        assert!(readme.starts_with("file:"));
        assert!(source.starts_with("file:"));

        assert_eq!(report.document.matches("\n### ").count(), 2);
        assert!(report.document.contains(&format!("### README.md\n\n{}\n", readme)));
        assert!(report.document.contains(&format!("### src/a.ts\n\n{}\n", source)));
        assert!(report.project_summary.starts_with("module:"));
        assert!(report
            .document
            .contains(&format!("## Project Summary\n\n{}\n", report.project_summary)));

        let module_prompts: Vec<String> = backend
            .prompts()
            .into_iter()
            .filter(|prompt| role_of(prompt) == "module")
            .collect();
        assert_eq!(module_prompts.len(), 2);
        let file_fragments: usize = module_prompts.iter().map(|p| p.matches("File: ").count()).sum();
        assert_eq!(file_fragments, 2);

        let root_prompt = &module_prompts[1];
        assert!(root_prompt.contains(&format!("File: README.md\nSummary: {}", readme)));
        assert!(root_prompt.contains("Module: src\nSummary: module:"));
    }

    #[tokio::test]
    async fn test_cancellation_discards_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            write(dir.path(), name, name);
        }

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let backend = Arc::new(ScriptedBackend::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                trigger.cancel();
            }
            Ok("summary".to_string())
        }));

        let mut config = Config::default();
        config.run.concurrency = 1;
        let documenter = ProjectDocumenter::with_backend(config, Some(backend.clone()));
        let outcome = documenter.run(dir.path(), &cancel).await.unwrap();

        match outcome {
            RunOutcome::Cancelled { summarized, total } => {
                assert_eq!(summarized, 2);
                assert_eq!(total, 5);
            }
            RunOutcome::Completed(_) => panic!("cancelled run reported success"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(backend.prompts().iter().all(|p| role_of(p) == "file"));
    }

    #[tokio::test]
    async fn test_cancel_during_aggregation_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", "a");
        write(dir.path(), "x/b.txt", "b");
        write(dir.path(), "y/c.txt", "c");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let backend = Arc::new(ScriptedBackend::new(move |prompt| {
            if role_of(prompt) == "module" {
                trigger.cancel();
            }
            Ok("summary".to_string())
        }));

        let mut config = Config::default();
        config.run.concurrency = 1;
        let documenter = ProjectDocumenter::with_backend(config, Some(backend.clone()));
        let outcome = documenter.run(dir.path(), &cancel).await.unwrap();

        match outcome {
            RunOutcome::Cancelled { summarized, total } => {
                assert_eq!(summarized, 3);
                assert_eq!(total, 3);
            }
            RunOutcome::Completed(_) => panic!("cancelled run reported success"),
        }
        let module_calls = backend.prompts().iter().filter(|p| role_of(p) == "module").count();
        assert_eq!(module_calls, 1);
    }

    #[tokio::test]
    async fn test_cancel_during_root_call_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", "a");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let backend = Arc::new(ScriptedBackend::new(move |prompt| {
            if role_of(prompt) == "module" {
                trigger.cancel();
            }
            Ok("summary".to_string())
        }));
        let documenter = ProjectDocumenter::with_backend(Config::default(), Some(backend));
        let outcome = documenter.run(dir.path(), &cancel).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_configured_output_dir_inside_project_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.rs", "fn main() {}");
        write(dir.path(), "docs/out/PROJECT_SUMMARY.md", "old run");

        let mut config = Config::default();
        config.run.output_dir = dir.path().join("docs/./out");
        let documenter = ProjectDocumenter::with_backend(config, None);

        let tree = documenter.build_tree(dir.path()).unwrap();
        assert_eq!(tree.file_paths(), vec!["keep.rs"]);
    }

    #[tokio::test]
    async fn test_module_failure_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", "a");

        let backend = Arc::new(ScriptedBackend::new(|prompt| {
            if role_of(prompt) == "module" {
                Err(LlmError::RequestFailed {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            } else {
                Ok("fine".to_string())
            }
        }));
        let documenter = ProjectDocumenter::with_backend(Config::default(), Some(backend));
        let err = documenter.run(dir.path(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DocError::Aggregation { .. }));
    }

    #[tokio::test]
    async fn test_missing_root_is_no_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let documenter = ProjectDocumenter::with_backend(Config::default(), None);
        let err = documenter
            .run(&dir.path().join("missing"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocError::NoWorkspace { .. }));
    }

    #[tokio::test]
    async fn test_ignore_patterns_and_output_dir_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.rs", "fn main() {}");
        write(dir.path(), "target/build.log", "noise");
        write(dir.path(), "project-docs/PROJECT_SUMMARY.md", "old run");

        let mut config = Config::default();
        config.filter.ignore_patterns = vec!["target/".to_string()];
        let documenter = ProjectDocumenter::with_backend(config, None);

        let tree = documenter.build_tree(dir.path()).unwrap();
        assert_eq!(tree.file_paths(), vec!["keep.rs"]);

        let RunOutcome::Completed(report) = documenter.run(dir.path(), &CancellationToken::new()).await.unwrap() else {
            panic!("run should complete");
        };
        assert_eq!(report.summaries.get("keep.rs"), Some("fn main() {}"));
        assert_eq!(report.project_summary, "File: keep.rs\nSummary: fn main() {}");
    }

    #[test]
    fn test_from_config_rejects_invalid_configuration() {
        let mut config = Config::default();
        config.run.concurrency = 0;
        assert!(matches!(
            ProjectDocumenter::from_config(config),
            Err(DocError::Validation { .. })
        ));
    }

    #[test]
    fn test_unknown_provider_uses_fallback() {
        let mut config = Config::default();
        config.provider = "mystery".to_string();
        let documenter = ProjectDocumenter::from_config(config).unwrap();
        assert!(documenter.provider_name().is_none());
    }
}
