//! layerdoc - layered project documentation
//!
//! Summarizes every file of a project with a pluggable completion backend,
//! aggregates those summaries bottom-up into per-directory module summaries
//! and a project summary, and assembles the results into one document.

pub mod config;
pub mod context;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types and traits
pub use config::{Config, ConfigManager};
pub use context::{FileEntry, IgnoreRuleSet, Node, PathFilter, ProjectTree};
pub use llm::{BackendFactory, CompletionBackend, LlmError};
pub use output::OutputWriter;
pub use pipeline::{ProjectDocumenter, RunOutcome, RunReport, SummaryStore};
pub use utils::errors::{ConfigError, DocError};

/// The main result type used throughout the application
pub type Result<T> = std::result::Result<T, DocError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "layerdoc";
