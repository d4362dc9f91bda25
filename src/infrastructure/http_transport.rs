// HTTP transport with per-request timeout and a single error channel
use super::endpoints::UrlBuilder;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Timeout: the request took longer than {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("Network error: {cause}")]
    Network { cause: String },
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },
}

/// Decoded response body. Non-JSON success bodies are kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Empty,
    Json(Value),
    Text(String),
}

impl RawBody {
    pub fn kind(&self) -> &'static str {
        match self {
            RawBody::Empty => "empty",
            RawBody::Json(_) => "json",
            RawBody::Text(_) => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    urls: UrlBuilder,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(urls: UrlBuilder, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            urls,
            timeout,
        }
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues one request. The timeout covers the whole exchange including the
    /// body; when it elapses the request future is dropped, aborting the call.
    pub async fn request(
        &self,
        url: &str,
        options: RequestOptions,
        timeout: Duration,
    ) -> Result<RawBody, TransportError> {
        self.exchange(url, options, timeout).await.map(|(_, body)| body)
    }

    /// Like `request`, but also returns the success status.
    pub async fn exchange(
        &self,
        url: &str,
        options: RequestOptions,
        timeout: Duration,
    ) -> Result<(StatusCode, RawBody), TransportError> {
        let url = self.urls.resolve(url);
        let timeout_ms = timeout.as_millis() as u64;

        let mut builder = self
            .client
            .request(options.method.clone(), &url)
            .headers(default_headers())
            .headers(options.headers);
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = match tokio::time::timeout(timeout, exchange).await {
            Err(_) => {
                tracing::warn!(url = %url, timeout_ms, "request timed out");
                return Err(TransportError::Timeout { timeout_ms });
            }
            Ok(Err(err)) => {
                tracing::warn!(url = %url, error = %err, "request failed");
                return Err(TransportError::Network {
                    cause: err.to_string(),
                });
            }
            Ok(Ok(pair)) => pair,
        };

        tracing::debug!(url = %url, method = %options.method, status = status.as_u16(), "response received");
        interpret_response(status, text).map(|body| (status, body))
    }

    pub async fn get(&self, url: &str) -> Result<RawBody, TransportError> {
        self.request(url, RequestOptions::default(), self.timeout).await
    }

    pub async fn post(&self, url: &str, body: Value) -> Result<RawBody, TransportError> {
        self.request(url, RequestOptions::with_method(Method::POST).json(body), self.timeout)
            .await
    }

    pub async fn put(&self, url: &str, body: Value) -> Result<RawBody, TransportError> {
        self.request(url, RequestOptions::with_method(Method::PUT).json(body), self.timeout)
            .await
    }

    pub async fn patch(&self, url: &str, body: Value) -> Result<RawBody, TransportError> {
        self.request(url, RequestOptions::with_method(Method::PATCH).json(body), self.timeout)
            .await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Maps a status and body to the transport result.
pub fn interpret_response(status: StatusCode, text: String) -> Result<RawBody, TransportError> {
    if !status.is_success() {
        let message = server_message(&text).unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        });
        return Err(TransportError::Http {
            status: status.as_u16(),
            message,
            body: text,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(RawBody::Empty);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => Ok(RawBody::Json(json)),
        Err(_) => Ok(RawBody::Text(text)),
    }
}

fn server_message(text: &str) -> Option<String> {
    let json: Value = serde_json::from_str(text).ok()?;
    ["message", "processMessage"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}
