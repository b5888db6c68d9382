//! LLM backend abstraction and provider implementations

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use prompts::{PromptRole, PromptTemplates};
pub use utils::strip_think_tags;

/// Error types for backend operations
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key for {provider} is not configured")]
    MissingApiKey { provider: String },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {retry_after:?}")]
    RateLimit { retry_after: Option<u64> },

    #[error("Request failed: {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl LlmError {
    /// Configuration problems are reported once; everything else is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingApiKey { .. } | Self::InvalidUrl(_))
    }

    /// Whether this error stems from configuration rather than the backend itself
    pub fn is_configuration(&self) -> bool {
        !self.is_retryable()
    }
}

/// Supported backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Local model server speaking the Ollama generate API
    Ollama,
    /// Hosted chat-completions API
    OpenAi,
}

impl ProviderKind {
    /// Parse a configured provider name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" | "local" => Some(Self::Ollama),
            "openai" | "hosted" => Some(Self::OpenAi),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }
}

/// A text-completion service turning one prompt into one completion.
///
/// Implementations own their retry policy and return text that has already
/// been post-processed (reasoning traces removed).
///
/// # Example
///
/// ```rust,no_run
/// use layerdoc::llm::CompletionBackend;
///
/// async fn describe(backend: &dyn CompletionBackend) -> Result<String, layerdoc::llm::LlmError> {
///     backend.complete("Summarize: fn main() {}").await
/// }
/// ```
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Provider name used in logs and placeholder texts
    fn provider_name(&self) -> &str;

    /// Complete a prompt
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Factory for creating backends from configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create the configured backend, or `None` when the provider name is not recognized
    pub fn create(config: &Config) -> Result<Option<Arc<dyn CompletionBackend>>, LlmError> {
        let Some(kind) = ProviderKind::from_name(&config.provider) else {
            tracing::warn!(
                "Unknown provider '{}', falling back to placeholder summaries",
                config.provider
            );
            return Ok(None);
        };

        let backend: Arc<dyn CompletionBackend> = match kind {
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(
                &config.ollama.base_url,
                &config.ollama.model,
            )?),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                &config.openai.base_url,
                &config.openai.model,
                config.effective_openai_key(),
            )?),
        };

        Ok(Some(backend))
    }

    /// List all available provider names
    pub fn list_providers() -> Vec<&'static str> {
        vec![ProviderKind::Ollama.name(), ProviderKind::OpenAi.name()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_name() {
        assert_eq!(ProviderKind::from_name("ollama"), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::from_name(" OpenAI "), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_name("gemini"), None);
    }

    #[test]
    fn test_missing_key_is_not_retryable() {
        let err = LlmError::MissingApiKey {
            provider: "openai".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.is_configuration());

        let transient = LlmError::RequestFailed {
            status: 401,
            message: "nope".to_string(),
        };
        assert!(transient.is_retryable());
    }

    #[test]
    fn test_factory_unknown_provider_yields_none() {
        let mut config = Config::default();
        config.provider = "carrier-pigeon".to_string();
        let backend = BackendFactory::create(&config).unwrap();
        assert!(backend.is_none());
    }

    #[test]
    fn test_factory_builds_default_local_backend() {
        let config = Config::default();
        let backend = BackendFactory::create(&config).unwrap().unwrap();
        assert_eq!(backend.provider_name(), "ollama");
    }
}
