// src/utils/http.rs

//! HTTP transport used by flight sources.
//!
//! Sources never talk to `reqwest` directly: they send [`HttpRequest`]
//! values through an [`HttpTransport`] session obtained from a
//! [`Connector`]. Each source invocation gets its own session, which is
//! dropped when the invocation ends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, serialized on send
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append several headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response with its body read to text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// One HTTP session.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the full body.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Opens HTTP sessions.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn HttpTransport>>;
}

/// Send a request and decode a 2xx JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    session: &dyn HttpTransport,
    request: HttpRequest,
) -> Result<T> {
    let url = request.url.clone();
    let response = session.send(request).await?;
    if !response.is_success() {
        return Err(AppError::Status {
            status: response.status,
            url,
        });
    }
    response.json()
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,fa;q=0.8"),
    );

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(default_headers)
        .build()?;
    Ok(client)
}

/// `reqwest`-backed session.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_error(&self, url: &str, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else if error.is_connect() {
            AppError::transport(url, error)
        } else {
            AppError::Http(error)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            if request.header_value(CONTENT_TYPE.as_str()).is_none() {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(serde_json::to_vec(body)?);
        }

        log::debug!("{} {}", request.method, request.url);

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;

        Ok(HttpResponse { status, body })
    }
}

/// Opens a fresh `reqwest` client per session.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: HttpConfig,
}

impl HttpConnector {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }
}

impl Connector for HttpConnector {
    fn connect(&self) -> Result<Box<dyn HttpTransport>> {
        Ok(Box::new(ReqwestTransport::new(&self.config)?))
    }
}
