//! [`Transport`] backed by `reqwest`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Url};
use tracing::debug;

use super::{is_dot_segment, ApiRequest, ApiResponse, Transport, TransportError};
use crate::config::Settings;

/// HTTPS transport pointed at the configured API base URL.
///
/// Cheap to clone: the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport from validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised or the base
    /// URL does not parse.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build HTTP client")?;
        let base_url = Url::parse(settings.api_url())
            .with_context(|| format!("invalid API URL: {}", settings.api_url()))?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        if let Some(segment) = request.path.iter().find(|s| is_dot_segment(s)) {
            return Err(TransportError::DotSegment(segment.clone()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(request.path.iter());
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        debug!(method = ?request.method, path = url.path(), "sending request");

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .bearer_auth(&request.bearer_token)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            // Also sets `Content-Type: application/json`.
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiResponse { status, body })
    }
}
