//! HTTP client for JSON endpoints.
//!
//! # Rust Learning Note
//!
//! This module uses hyper's pooled client from `hyper-util`.
//!
//! ## Request Flow
//!
//! ```rust,ignore
//! // 1. Resolve the URL and check the scheme
//! let uri = resolve_uri(url)?;
//!
//! // 2. Send the request
//! let resp = self.client.request(req).await?;
//!
//! // 3. Buffer the whole body
//! let bytes = resp.into_body().collect().await?.to_bytes();
//!
//! // 4. Try JSON, keep the raw text otherwise
//! let data = ResponseBody::parse(&bytes);
//! ```
//!
//! ## What Counts as a Failure
//!
//! Only steps 1-3 can fail. A 404 or a 500 is still a *response*: it
//! comes back as `Ok(ClientResponse)` with `status` set, and callers
//! decide what the status means to them.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use svcreg_common::{Error, Result};
use tracing::debug;
use url::Url;

/// Where and how to send a request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: Method,
    /// Extra headers. A header named here replaces the client default
    /// of the same name.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response body, parsed when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body was valid JSON.
    Json(Value),
    /// The body was not JSON (or was empty); this is the raw text.
    Text(String),
}

impl ResponseBody {
    /// Parses `bytes` as JSON, keeping the (lossily decoded) text on failure.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// A completed exchange. Any status code, including 4xx/5xx, lands here.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub data: ResponseBody,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ClientResponse {
    /// Decodes a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            ResponseBody::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::Serialization(format!("Failed to decode response: {}", e))),
            ResponseBody::Text(text) => Err(Error::Serialization(format!(
                "Response body is not JSON: {:?}",
                text
            ))),
        }
    }
}

/// Pooled HTTP/1.1 client. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpClient {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client }
    }

    /// Sends one request and buffers the full response.
    ///
    /// `data` is written verbatim when it is a JSON string and serialized
    /// otherwise; `None` and `null` send no body.
    pub async fn request(&self, options: RequestOptions, data: Option<&Value>) -> Result<ClientResponse> {
        let uri = resolve_uri(&options.url)?;
        let headers = build_headers(&options.headers)?;
        let body = encode_body(data)?;

        let mut request = Request::builder()
            .method(options.method.clone())
            .uri(uri)
            .body(Full::new(body))
            .map_err(|e| Error::Internal(format!("Failed to build request: {}", e)))?;
        *request.headers_mut() = headers;

        debug!("{} {}", options.method, options.url);

        let response = self.client.request(request).await.map_err(|e| {
            Error::Transport(format!("{} {} failed: {}", options.method, options.url, e))
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        debug!("{} {} -> {} ({} bytes)", options.method, options.url, status, bytes.len());

        Ok(ClientResponse {
            data: ResponseBody::parse(&bytes),
            status,
            headers,
        })
    }

    pub async fn get(&self, url: &str) -> Result<ClientResponse> {
        self.request(RequestOptions::new(Method::GET, url), None).await
    }

    /// Sends `data` as the body, or `{}` when `data` is `None`.
    pub async fn post(&self, url: &str, data: Option<&Value>) -> Result<ClientResponse> {
        let empty = Value::Object(serde_json::Map::new());
        self.request(RequestOptions::new(Method::POST, url), Some(data.unwrap_or(&empty)))
            .await
    }

    /// Sends `data` as the body, or `{}` when `data` is `None`.
    pub async fn put(&self, url: &str, data: Option<&Value>) -> Result<ClientResponse> {
        let empty = Value::Object(serde_json::Map::new());
        self.request(RequestOptions::new(Method::PUT, url), Some(data.unwrap_or(&empty)))
            .await
    }

    pub async fn delete(&self, url: &str) -> Result<ClientResponse> {
        self.request(RequestOptions::new(Method::DELETE, url), None).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `raw` and checks the scheme before any I/O happens.
fn resolve_uri(raw: &str) -> Result<Uri> {
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e.to_string()))?;

    if url.scheme() != "http" {
        return Err(Error::unsupported_scheme(url.scheme()));
    }

    url.as_str()
        .parse::<Uri>()
        .map_err(|e| Error::invalid_url(raw, e.to_string()))
}

fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::validation(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::validation(format!("Invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn encode_body(data: Option<&Value>) -> Result<Bytes> {
    match data {
        None | Some(Value::Null) => Ok(Bytes::new()),
        Some(Value::String(raw)) => Ok(Bytes::from(raw.clone())),
        Some(value) => serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| Error::Serialization(e.to_string())),
    }
}
