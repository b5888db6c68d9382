//! Error types used throughout the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for layerdoc
#[derive(Error, Debug)]
pub enum DocError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("No workspace: {path} is not a directory")]
    NoWorkspace { path: PathBuf },

    #[error("Aggregation failed for module '{module}': {source}")]
    Aggregation {
        module: String,
        #[source]
        source: crate::llm::LlmError,
    },

    #[error("Summary store error: {message}")]
    Store { message: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("File system error: {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Cancelled: {operation}")]
    Cancelled { operation: String },

    #[error("Ignore rule error: {0}")]
    Ignore(#[from] ignore::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read configuration: {source}")]
    ReadError {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write configuration: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {source}")]
    SerializeError {
        #[source]
        source: toml::ser::Error,
    },
}

impl DocError {
    /// Create a new aggregation error for a module path
    pub fn aggregation<S: Into<String>>(module: S, source: crate::llm::LlmError) -> Self {
        Self::Aggregation {
            module: module.into(),
            source,
        }
    }

    /// Create a new summary store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn no_workspace<P: Into<PathBuf>>(path: P) -> Self {
        Self::NoWorkspace { path: path.into() }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new cancelled error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a new unknown error
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Llm(_) => "llm",
            Self::NoWorkspace { .. } => "workspace",
            Self::Aggregation { .. } => "aggregation",
            Self::Store { .. } => "store",
            Self::Validation { .. } => "validation",
            Self::FileSystem { .. } => "filesystem",
            Self::NotFound { .. } => "notfound",
            Self::Cancelled { .. } => "cancelled",
            Self::Ignore(_) => "ignore",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
            Self::Unknown { .. } => "unknown",
        }
    }
}
