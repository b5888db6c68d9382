//! Prompt templates for file, module and project summaries

use crate::config::PromptOverrides;

/// Built-in template for a single file
pub const DEFAULT_FILE_PROMPT: &str = "You are documenting a software project. \
Summarize the following file in a few short paragraphs: its purpose, the main \
types and functions it defines, and how it is likely used by the rest of the project.";

/// Built-in template for a directory built from its children's summaries
pub const DEFAULT_MODULE_PROMPT: &str = "You are documenting a software project. \
Below are summaries of the files and sub-modules inside one directory. Write a \
cohesive summary of this module: its responsibility, how its parts fit together, \
and what it offers to the rest of the project.";

/// Built-in template for the whole project (kept for configuration compatibility;
/// the root summary is produced with the module template)
pub const DEFAULT_PROJECT_PROMPT: &str = "You are documenting a software project. \
Using the module and file summaries below, write an overview of the whole project: \
what it does, how it is organized, and where a new contributor should start reading.";

/// The three template roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    File,
    Module,
    Project,
}

impl PromptRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Module => "module",
            Self::Project => "project",
        }
    }
}

/// Effective templates for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    file: String,
    module: String,
    project: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            file: DEFAULT_FILE_PROMPT.to_string(),
            module: DEFAULT_MODULE_PROMPT.to_string(),
            project: DEFAULT_PROJECT_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Resolve templates: a non-blank override wins, otherwise the built-in default
    pub fn from_overrides(overrides: &PromptOverrides) -> Self {
        Self {
            file: pick(&overrides.file, DEFAULT_FILE_PROMPT),
            module: pick(&overrides.module, DEFAULT_MODULE_PROMPT),
            project: pick(&overrides.project, DEFAULT_PROJECT_PROMPT),
        }
    }

    pub fn get(&self, role: PromptRole) -> &str {
        match role {
            PromptRole::File => &self.file,
            PromptRole::Module => &self.module,
            PromptRole::Project => &self.project,
        }
    }

    /// File prompt: template, the file's path, then its content in a fenced block
    pub fn file_prompt(&self, file_path: &str, content: &str) -> String {
        format!("{}\n\nFile: {}\n\n```\n{}\n```", self.file, file_path, content)
    }

    /// Module prompt: template followed by the joined child fragments
    pub fn module_prompt(&self, fragments: &str) -> String {
        format!("{}\n\n{}", self.module, fragments)
    }
}

fn pick(candidate: &str, default: &str) -> String {
    if candidate.trim().is_empty() {
        default.to_string()
    } else {
        candidate.to_string()
    }
}
