//! HTTP transport seam.
//!
//! The coordinator talks to the backend through the [`Transport`] trait so
//! tests can script responses. [`HttpTransport`] is the reqwest-backed
//! implementation used in production.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::connectivity::NetworkState;
use super::error::TransportError;
use super::method::HttpMethod;
use crate::queue::QueueItem;

/// An API call relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, endpoint).with_body(body)
    }

    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, endpoint).with_body(body)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl From<&QueueItem> for ApiRequest {
    fn from(item: &QueueItem) -> Self {
        let body = match &item.payload {
            Value::Null => None,
            payload => Some(payload.clone()),
        };
        Self {
            method: item.method.into(),
            endpoint: item.endpoint.clone(),
            body,
        }
    }
}

/// Status and decoded body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange. Non-2xx statuses are returned as responses,
    /// not errors; only failures to complete the exchange are errors.
    async fn send(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport with optional bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an endpoint onto the base URL, defaulting the scheme to http.
    pub fn build_url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("http://{}", base_url)
    };

    let base_url = base_url.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{}{}", base_url, endpoint)
    } else {
        format!("{}/{}", base_url, endpoint)
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_decode() {
        TransportError::InvalidResponse(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}

/// Empty bodies decode to null, non-JSON bodies to a string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.build_url(&request.endpoint);
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url).timeout(timeout);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %url, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        Ok(ApiResponse::new(status, decode_body(&text)))
    }
}

/// Checks backend reachability with `GET {base_url}/health`.
///
/// Any HTTP answer counts as online. A timeout means the network is up but the
/// backend cannot be reached; a connection failure means fully offline.
pub async fn probe_server(base_url: &str, timeout: Duration) -> NetworkState {
    let url = join_url(base_url, "/health");
    let result = reqwest::Client::new().get(&url).timeout(timeout).send().await;

    match result {
        Ok(response) => {
            tracing::debug!(status = response.status().as_u16(), "health probe answered");
            NetworkState::ONLINE
        }
        Err(e) if e.is_timeout() => {
            tracing::debug!(url = %url, "health probe timed out");
            NetworkState {
                reachable: true,
                internet_reachable: false,
            }
        }
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "health probe failed");
            NetworkState::OFFLINE
        }
    }
}
