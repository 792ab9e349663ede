//! Shared HTTP client and error mapping.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::HelmError;

/// Per-request timeout of the shared client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Send a JSON POST and decode a JSON response, mapping non-2xx statuses
/// through [`status_to_error`].
pub async fn post_json<T: serde::de::DeserializeOwned>(
    url: &str,
    headers: HeaderMap,
    body: &serde_json::Value,
) -> Result<T, HelmError> {
    let resp = shared_client()
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await?;

    let status = resp.status().as_u16();
    if !(200..300).contains(&status) {
        let body_text = resp.text().await.unwrap_or_default();
        return Err(status_to_error(status, &body_text));
    }
    Ok(resp.json().await?)
}

/// Map an HTTP error status and body to a [`HelmError`].
///
/// A 429 whose body mentions quota exhaustion (`insufficient_quota`,
/// `RESOURCE_EXHAUSTED`, or the word "quota") is reported as
/// [`HelmError::QuotaExceeded`]; any other 429 is a transient rate limit.
pub fn status_to_error(status: u16, body: &str) -> HelmError {
    match status {
        401 | 403 => HelmError::Authentication(error_message(body)),
        429 if is_quota_body(body) => HelmError::QuotaExceeded(error_message(body)),
        429 => HelmError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => HelmError::api(status, error_message(body)),
    }
}

fn is_quota_body(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("quota") || lower.contains("resource_exhausted")
}

/// Pull `error.message` out of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
