//! Hosted chat-completions provider

use super::{ollama::endpoint_url, utils::strip_think_tags, CompletionBackend, LlmError};
use crate::utils::http::{self, execute_with_retry, json_bearer_headers, RetryConfig};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Hosted-API backend: single user message to `<base>/chat/completions` with a bearer token
pub struct OpenAiProvider {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl OpenAiProvider {
    /// Create a new provider; a missing key is only reported when a completion is requested
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: http::create_client(http::DEFAULT_TIMEOUT)?,
            endpoint: endpoint_url(base_url, "chat/completions")?,
            model: model.to_string(),
            api_key,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn create_headers(&self) -> Result<HeaderMap, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey {
                provider: self.provider_name().to_string(),
            })?;

        json_bearer_headers(key).map_err(|_| LlmError::MissingApiKey {
            provider: self.provider_name().to_string(),
        })
    }

    async fn send_once(&self, headers: &HeaderMap, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(headers.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(http::parse_http_error(status, &body));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            message: format!("Failed to parse chat completion: {}", e),
        })?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "No choices in response".to_string(),
            })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let headers = self.create_headers()?;
        let raw = execute_with_retry(|| self.send_once(&headers, prompt), &self.retry).await?;
        Ok(strip_think_tags(&raw))
    }
}
