//! HTTP client for the Stillwater admin API.
//!
//! All outbound requests go through [`ApiClient`], which applies a fixed
//! per-request timeout and normalizes every failure into a [`NetworkError`].
//! The client never retries on its own; retry policy belongs to the callers
//! (see [`crate::health`] and [`crate::poll`]).
//!
//! # Example
//!
//! ```no_run
//! use stillwater_doctor::ApiClient;
//!
//! # tokio_test::block_on(async {
//! let api = ApiClient::new("http://127.0.0.1:8000");
//! match api.get("/health").await {
//!     Ok(_) => println!("server is up"),
//!     Err(e) => println!("unreachable: {} (status {})", e.message, e.status),
//! }
//! # });
//! ```

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Fixed request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A normalized request failure.
///
/// `status` is the HTTP status code for non-2xx responses, and `0` for
/// everything that never produced an HTTP response (timeout, abort,
/// unreachable host). The error is constructed only by [`ApiClient`] and
/// the offline fallback in [`crate::graph::OfflineProxy`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NetworkError {
    /// Human-readable failure description.
    pub message: String,
    /// HTTP status code, or 0 for non-HTTP failures.
    pub status: u16,
    /// The URL that was requested.
    pub url: String,
}

/// Body for `POST /api/llm/config`.
#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    pub default_model: String,
    pub claude_code_enabled: bool,
    pub auto_start_wrapper: bool,
}

/// Body for `POST /api/solace-agi/config`.
#[derive(Debug, Clone, Serialize)]
pub struct SolaceConfig {
    pub api_key: String,
    pub auto_sync: bool,
}

/// HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client with the default [`REQUEST_TIMEOUT`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path. Persistent diagram cache entries are keyed
    /// by this value.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Perform a GET request and return the parsed JSON body.
    pub async fn get(&self, path: &str) -> Result<Value, NetworkError> {
        let url = self.url_for(path);
        let request = self.http.get(&url).timeout(self.timeout);
        self.execute(request, url).await
    }

    /// Perform a POST request with a JSON body and return the parsed JSON
    /// response body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, NetworkError> {
        let url = self.url_for(path);
        let request = self.http.post(&url).timeout(self.timeout).json(body);
        self.execute(request, url).await
    }

    /// Submit LLM configuration.
    pub async fn set_llm_config(&self, config: &LlmConfig) -> Result<Value, NetworkError> {
        self.post("/api/llm/config", config).await
    }

    /// Submit Solace AGI configuration.
    pub async fn set_solace_config(&self, config: &SolaceConfig) -> Result<Value, NetworkError> {
        self.post("/api/solace-agi/config", config).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: String,
    ) -> Result<Value, NetworkError> {
        let response = request.send().await.map_err(|e| transport_error(e, &url))?;
        let status = response.status();

        // A body that isn't valid JSON is treated as an empty object so
        // callers can still inspect the status outcome.
        let body = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default())),
            Err(e) => return Err(transport_error(e, &url)),
        };

        if !status.is_success() {
            let code = status.as_u16();
            debug!(url = %url, status = code, "request failed");
            return Err(NetworkError {
                message: error_message(&body, code),
                status: code,
                url,
            });
        }

        Ok(body)
    }
}

fn transport_error(err: reqwest::Error, url: &str) -> NetworkError {
    let message = if err.is_timeout() {
        "Request timed out".to_string()
    } else {
        err.to_string()
    };
    NetworkError {
        message,
        status: 0,
        url: url.to_string(),
    }
}

/// Extract a failure message from an error response body: the `error` or
/// `detail` field when present, else a plain `HTTP <status>`.
pub(crate) fn error_message(body: &Value, status: u16) -> String {
    body.get("error")
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}
