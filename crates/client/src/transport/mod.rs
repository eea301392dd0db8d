//! The network collaborator: one HTTP exchange per call, no retries.
//!
//! Operations describe a request as an [`ApiRequest`] and hand it to a
//! [`Transport`]. Non-2xx statuses come back as ordinary [`ApiResponse`]s;
//! only a failed exchange is an error.

pub mod http;

pub use http::HttpTransport;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use sot_common::SotError;
use thiserror::Error;

/// HTTP verbs used by the service API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request relative to the configured base URL.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments appended to the base URL; each one is percent-encoded.
    pub path: Vec<String>,
    /// Query pairs, form-urlencoded.
    pub query: Vec<(String, String)>,
    pub bearer_token: String,
    /// JSON body. Absent for show.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, path: I, bearer_token: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            bearer_token: bearer_token.to_owned(),
            body: None,
        }
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Attach a JSON body built from any serialisable value.
    ///
    /// # Errors
    ///
    /// Returns [`SotError::Network`] if `body` cannot be represented as JSON.
    pub fn with_json<T: serde::Serialize>(mut self, body: &T) -> Result<Self, SotError> {
        let value = serde_json::to_value(body)
            .map_err(|e| SotError::Network(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("bearer_token", &"[REDACTED]")
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// `.` and `..` are removed by URL path normalisation, percent-encoded or not,
/// so they can never reach the server as a segment.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Errors produced when an exchange could not be completed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The base URL cannot carry path segments.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// A path segment would be dropped from the URL.
    #[error("path segment {0:?} cannot be addressed")]
    DotSegment(String),

    /// Connecting, sending, or reading the response failed.
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

impl From<TransportError> for SotError {
    fn from(err: TransportError) -> Self {
        SotError::Network(err.to_string())
    }
}

/// Performs a single HTTP exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once and return whatever status the server answered with.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
