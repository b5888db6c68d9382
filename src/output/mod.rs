//! Durable storage of run results

use crate::pipeline::RunReport;
use crate::utils::errors::DocError;
use crate::utils::path::summary_path;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Assembled document file name
pub const DOCUMENT_FILE: &str = "PROJECT_SUMMARY.md";
/// Declarative tree file name
pub const TREE_FILE: &str = "project_tree.json";
/// Directory holding one summary file per project file
pub const FILES_DIR: &str = "files";

/// What a write produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub document: PathBuf,
    pub tree: PathBuf,
    pub file_summaries: usize,
}

/// Writes documents and per-file summaries under an output directory
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the document, the tree and every file summary
    pub async fn write(&self, report: &RunReport) -> Result<WrittenOutput> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DocError::file_system(&self.dir, e))?;

        let document = self.dir.join(DOCUMENT_FILE);
        write_file(&document, &report.document).await?;

        let tree = self.dir.join(TREE_FILE);
        write_file(&tree, &report.tree.to_json_pretty()?).await?;

        let files_dir = self.dir.join(FILES_DIR);
        let mut file_summaries = 0;
        for (relative, summary) in report.summaries.iter() {
            let target = summary_path(&files_dir, relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DocError::file_system(parent, e))?;
            }
            write_file(&target, summary).await?;
            file_summaries += 1;
        }

        tracing::info!("Wrote {} file summaries to {}", file_summaries, self.dir.display());
        Ok(WrittenOutput {
            document,
            tree,
            file_summaries,
        })
    }

    /// Read back one persisted file summary by its project-relative path
    pub async fn read_file_summary(&self, relative: &str) -> Result<String> {
        let target = summary_path(&self.dir.join(FILES_DIR), relative);
        match fs::read_to_string(&target).await {
            Ok(summary) => Ok(summary),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocError::not_found(format!("summary for '{}'", relative)))
            }
            Err(e) => Err(DocError::file_system(target, e)),
        }
    }
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .await
        .map_err(|e| DocError::file_system(path, e))
}
