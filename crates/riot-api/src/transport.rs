//! HTTP transport seam.
//!
//! The client only needs a single `GET` that yields a status, the app
//! rate-limit count header and an optional JSON body. Tests substitute an
//! in-memory implementation.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Header carrying the upstream's view of the app-level call counts.
pub const RATE_LIMIT_COUNT_HEADER: &str = "X-App-Rate-Limit-Count";

/// A raw upstream response before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Raw value of [`RATE_LIMIT_COUNT_HEADER`], e.g. `"3:1,40:120"`.
    pub rate_limit_count: Option<String>,
    /// Decoded body. `None` when the response was not JSON.
    pub body: Option<serde_json::Value>,
}

impl RawResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            rate_limit_count: None,
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            rate_limit_count: None,
            body: None,
        }
    }

    pub fn with_rate_limit_count(mut self, header: impl Into<String>) -> Self {
        self.rate_limit_count = Some(header.into());
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET. Only failures to obtain a response at all are errors;
    /// every HTTP status is returned as a [`RawResponse`].
    async fn get(&self, url: &Url) -> ApiResult<RawResponse>;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> ApiResult<Self> {
        install_rustls_provider();

        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(8);
        if request_timeout > Duration::ZERO {
            builder = builder.timeout(request_timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> ApiResult<RawResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let rate_limit_count = response
            .headers()
            .get(RATE_LIMIT_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        trace!(status, path = url.path(), is_json, "riot api response");

        let body = if is_json {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiError::Connection(e.to_string()))?;
            // Error bodies are informational only; a broken one is not fatal.
            match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(e) if status == 200 => return Err(e.into()),
                Err(_) => None,
            }
        } else {
            None
        };

        Ok(RawResponse {
            status,
            rate_limit_count,
            body,
        })
    }
}
