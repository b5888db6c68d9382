//! Configuration management for layerdoc

use crate::llm::ProviderKind;
use crate::utils::errors::{ConfigError, DocError};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the hosted-API key; wins over the config file
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration, built once per run and never mutated afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend provider name ("ollama" or "openai")
    pub provider: String,
    /// Local endpoint settings
    pub ollama: OllamaConfig,
    /// Hosted API settings
    pub openai: OpenAiConfig,
    /// File selection settings
    pub filter: FilterConfig,
    /// Prompt template overrides
    pub prompts: PromptOverrides,
    /// Run settings
    pub run: RunConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Local model server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

/// Hosted chat-completions configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// API key; `OPENAI_API_KEY` takes precedence when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Which files take part in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Additional gitignore-style patterns, always applied
    pub ignore_patterns: Vec<String>,
    /// Whether to read the project's `.gitignore`
    pub use_gitignore: bool,
    /// Maximum file size in bytes (0 = unlimited)
    pub max_file_size: u64,
}

/// Prompt overrides; blank values select the built-in template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOverrides {
    pub file: String,
    pub module: String,
    pub project: String,
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of files summarized concurrently
    pub concurrency: usize,
    /// Output directory, relative to the project root unless absolute
    pub output_dir: PathBuf,
    /// Lines kept by the placeholder summary when no provider is recognized
    pub fallback_lines: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama.name().to_string(),
            ollama: OllamaConfig::default(),
            openai: OpenAiConfig::default(),
            filter: FilterConfig::default(),
            prompts: PromptOverrides::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            use_gitignore: true,
            max_file_size: 0,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            output_dir: PathBuf::from("project-docs"),
            fallback_lines: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Hosted-API key: environment first, then the config file
    pub fn effective_openai_key(&self) -> Option<String> {
        std::env::var(OPENAI_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.openai.api_key.clone())
    }

    /// Resolve the output directory against a project root
    pub fn output_dir_for(&self, root: &Path) -> PathBuf {
        if self.run.output_dir.is_absolute() {
            self.run.output_dir.clone()
        } else {
            root.join(&self.run.output_dir)
        }
    }

    /// Check if the configuration is valid
    pub fn validate(&self) -> Result<()> {
        if self.run.concurrency == 0 {
            return Err(DocError::validation("run.concurrency", "must be at least 1"));
        }

        for (field, base_url) in [
            ("ollama.base_url", &self.ollama.base_url),
            ("openai.base_url", &self.openai.base_url),
        ] {
            if url::Url::parse(base_url).is_err() {
                return Err(DocError::validation(field, format!("'{}' is not a valid URL", base_url)));
            }
        }

        Ok(())
    }
}

/// Configuration manager for loading and saving the configuration file
pub struct ConfigManager {
    config: Config,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load configuration from `path`, or from the default location; a missing file yields defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            tracing::debug!("No configuration at {}, using defaults", config_path.display());
            Config::default()
        };

        Ok(Self { config, config_path })
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the manager, keeping the configuration
    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the default configuration; refuses to overwrite unless `force`
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            return Ok(false);
        }
        Self::save_config(path, &Config::default())?;
        Ok(true)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::FileNotFound {
            path: PathBuf::from("config directory"),
        })?;

        Ok(config_dir.join("layerdoc").join("config.toml"))
    }

    /// Load configuration from file
    fn load_config(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError { source: e })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError { source: e })
            .map_err(Into::into)
    }

    /// Save configuration to file
    fn save_config(path: &Path, config: &Config) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError { source: e })?;
            }
        }

        let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError { source: e })?;

        Ok(())
    }
}
