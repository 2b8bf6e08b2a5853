//! HTTP transport: one configured client, bearer injection, typed failures.

use crate::config::ClientConfig;
use crate::session::SessionProvider;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Credential missing, expired, or rejected (HTTP 401).
    #[error("unauthorized: credential rejected")]
    Unauthorized,
    /// Valid session but insufficient rights (HTTP 403).
    #[error("forbidden: {detail}")]
    Forbidden { detail: String },
    /// Request body rejected by the backend schema (HTTP 422); carries the
    /// structured error body verbatim for display.
    #[error("validation failed: {0}")]
    ValidationFailed(Value),
    /// Any other non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Failed { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One round-trip against the backend. Implementations inject the bearer
/// credential, serialize bodies as JSON, and normalize non-2xx responses
/// into [`TransportError`] without side effects and without retrying.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError>;

    /// Same contract, for endpoints that answer with a bare string body
    /// (presigned URLs are served as text, not JSON).
    async fn request_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpTransport {
    pub fn new(
        config: &ClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Bearer header from the session; read fresh on every call.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.session.current_token() {
            let value = format!("Bearer {token}");
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "request");
        let mut request = self
            .client
            .request(method, url)
            .headers(self.auth_headers());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn failure(path: &str, response: reqwest::Response) -> TransportError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), path, "request failed");
        classify(status, &body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let response = self.send(method, path, body, query).await?;
        if !response.status().is_success() {
            return Err(Self::failure(path, response).await);
        }
        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn request_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let response = self.send(method, path, None, query).await?;
        if !response.status().is_success() {
            return Err(Self::failure(path, response).await);
        }
        let text = response.text().await?;
        // Tolerate backends that quote the string as JSON.
        Ok(serde_json::from_str::<String>(&text).unwrap_or(text))
    }
}

/// Map a non-2xx status and its body onto the error taxonomy.
fn classify(status: StatusCode, body: &str) -> TransportError {
    match status.as_u16() {
        401 => TransportError::Unauthorized,
        403 => TransportError::Forbidden {
            detail: detail_from(body),
        },
        422 => TransportError::ValidationFailed(
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())),
        ),
        status => TransportError::Failed {
            status,
            body: body.to_string(),
        },
    }
}

/// Pull the backend's `detail` message out of an error body, falling back
/// to the raw body.
fn detail_from(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
