//! Shared HTTP utilities for backend providers
//!
//! Client setup, retry logic and error mapping shared by the local-endpoint
//! and hosted-API providers.

use crate::llm::LlmError;
use reqwest::Client;
use std::time::Duration;

pub mod headers;
pub mod retry;

pub use headers::json_bearer_headers;
pub use retry::{execute_with_retry, execute_with_retry_observed, RetryConfig};

/// Per-request timeout for backend calls (2 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Retries after the first attempt
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Base delay for exponential backoff
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// User agent sent with every backend request
pub fn user_agent() -> String {
    format!("layerdoc/{}", env!("CARGO_PKG_VERSION"))
}

/// Create a reqwest client with the standard timeout and user agent
pub fn create_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .map_err(LlmError::Network)
}

/// Parse standard HTTP error responses
pub fn parse_http_error(status: u16, body: &str) -> LlmError {
    match status {
        429 => LlmError::RateLimit {
            retry_after: extract_retry_after(body),
        },
        401 | 403 => LlmError::Authentication {
            message: "Invalid API key or insufficient permissions".to_string(),
        },
        _ => LlmError::RequestFailed {
            status,
            message: body.to_string(),
        },
    }
}

/// Extract retry-after value from error response
fn extract_retry_after(body: &str) -> Option<u64> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("retry_after")
        .and_then(|v| v.as_u64())
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|v| v.as_u64())
        })
}
