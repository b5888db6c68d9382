//! Request headers for the hosted-API backend

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// JSON content type plus a bearer `Authorization` header marked sensitive
pub fn json_bearer_headers(token: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}
