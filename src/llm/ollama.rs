//! Local model endpoint provider (Ollama generate API)

use super::{utils::strip_think_tags, CompletionBackend, LlmError};
use crate::utils::http::{self, execute_with_retry, RetryConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local-endpoint backend: POSTs `{model, prompt, stream: false}` to `<base>/api/generate`
pub struct OllamaProvider {
    client: Client,
    endpoint: Url,
    model: String,
    retry: RetryConfig,
}

impl OllamaProvider {
    /// Create a new provider for the given server and model
    pub fn new(base_url: &str, model: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: http::create_client(http::DEFAULT_TIMEOUT)?,
            endpoint: endpoint_url(base_url, "api/generate")?,
            model: model.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_once(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(http::parse_http_error(status, &body));
        }

        let reply: GenerateResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            message: format!("Failed to parse generate response: {}", e),
        })?;

        Ok(reply.response)
    }
}

#[async_trait]
impl CompletionBackend for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let raw = execute_with_retry(|| self.send_once(prompt), &self.retry).await?;
        Ok(strip_think_tags(&raw))
    }
}

/// Join a relative API path onto a configured base URL, tolerating a missing trailing slash
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, LlmError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?.join(path)?)
}
