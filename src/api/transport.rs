//! Request/response exchange with the pet service

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::TransportError;
use super::response::RemoteResponse;
use crate::config::Config;

/// HTTP methods used by the guided session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single request as issued by the step engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: Method,
    /// Path relative to the service root, including any query string
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One request/response exchange with the remote service.
///
/// Implementations make a single attempt and surface any failure to
/// complete the exchange immediately; there is no retry layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RemoteResponse, TransportError>;
}

/// reqwest-backed transport speaking JSON
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given service root
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| TransportError::InvalidUrl(base_url.clone()))?;

        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::network)?;

        Ok(Self { client, base_url })
    }

    /// Create a transport from the `[api]` config section
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(&config.api.base_url, &config.api.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RemoteResponse, TransportError> {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header("Content-Type", "application/json");
        if let Some(ref payload) = request.payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            TransportError::network(e)
        })?;

        // Rejections come back as JSON bodies too, so the status is informational
        let status = response.status();
        debug!(status = status.as_u16(), %url, "response received");

        let body = response.json::<Value>().await.map_err(|e| {
            warn!(%url, error = %e, "response body was not JSON");
            TransportError::network(e)
        })?;
        Ok(RemoteResponse::from_value(body))
    }
}
