//! HTTP client core.
//!
//! DESIGN
//! ======
//! One `HttpClient` per logical backend surface (auth-only and general).
//! Both are built from the same `ClientConfig` and share a cookie jar, so a
//! session cookie renewed by the auth client is immediately visible to the
//! general one. With credentials disabled no jar is installed at all and
//! cookies are neither stored nor sent.
//!
//! Requests are described by a `PendingRequest` that owns its JSON body, so
//! the interceptor can replay it verbatim after a refresh.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;

// =============================================================================
// PENDING REQUEST
// =============================================================================

/// An outbound call plus its single-shot retry marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    retried: bool,
}

impl PendingRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, query: Vec::new(), retried: false }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?);
        Ok(self)
    }

    /// Attach query parameters from a flat serializable struct.
    /// `null` fields are skipped; scalars are rendered without quotes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `params` does not serialize to a flat
    /// JSON object.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::Encode(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ApiError::Encode("query parameters must be an object".into()));
        };
        for (key, value) in map {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::Encode(format!("query parameter `{key}` is not a scalar")));
                }
            };
            self.query.push((key, rendered));
        }
        Ok(self)
    }

    /// Whether this request has already been replayed after a refresh.
    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

// =============================================================================
// REPLY
// =============================================================================

/// A successful (2xx) response with its raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    with_credentials: bool,
    label: &'static str,
}

impl HttpClient {
    /// Build a client for `config.backend_url`.
    ///
    /// `jar` is only installed when `config.with_credentials` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the TLS backend or builder fails.
    pub fn new(config: &ClientConfig, jar: Arc<Jar>, label: &'static str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if config.timeouts.request_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeouts.request_secs));
        }
        if config.with_credentials {
            builder = builder.cookie_provider(jar);
        }
        let http = builder.build().map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.backend_url.clone(), with_credentials: config.with_credentials, label })
    }

    #[must_use]
    pub fn with_credentials(&self) -> bool {
        self.with_credentials
    }

    /// Absolute URL for a backend path. Paths with and without a leading
    /// slash are accepted.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `method path` with an optional JSON body and query options.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<ApiReply, ApiError> {
        let mut request = PendingRequest::new(method, path);
        request.body = body;
        request.query = query.to_vec();
        self.execute(&request).await
    }

    /// Execute a pending request once. No interception happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrives, or the status
    /// variant matching a non-2xx response.
    pub async fn execute(&self, request: &PendingRequest) -> Result<ApiReply, ApiError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(client = self.label, path = %request.path, error = %e, "request failed before response");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(client = self.label, path = %request.path, status, "backend returned error status");
            return Err(ApiError::from_status(status, &request.path, body));
        }
        Ok(ApiReply { status, body })
    }
}
