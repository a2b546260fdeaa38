//! Outbound call representation and the network seam.
//!
//! Adapters never talk to `reqwest` directly; they hand an [`OutboundCall`] to
//! a [`Transport`]. Production wires in [`ReqwestTransport`], tests wire in a
//! scripted fake.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, error};

use crate::gateway::providers::{ProviderDescriptor, ProviderId};
use crate::gateway::template::{TemplateError, render};
use crate::gateway::validation::is_dot_segment;

/// One fully resolved HTTP GET towards a provider.
#[derive(Clone)]
pub struct OutboundCall {
    pub provider: ProviderId,
    pub url: Url,
    pub headers: HeaderMap,
    secret_query_param: Option<&'static str>,
}

impl OutboundCall {
    /// Builds a call from a provider descriptor and endpoint templates.
    ///
    /// # Arguments
    /// * `provider` - Descriptor supplying base URL and credential
    /// * `path` - Path template relative to the base URL, e.g. `/competitions/{competition}/matches`
    /// * `query` - Query templates as `(name, value template)` pairs
    /// * `lookup` - Resolves placeholder names to values
    ///
    /// # Returns
    /// * `Ok(OutboundCall)` - Call with encoded path/query and credential attached
    /// * `Err(TemplateError)` - A placeholder had no value, a path segment rendered
    ///   to `.`/`..`, or the credential was unusable
    pub fn build<'a>(
        provider: &ProviderDescriptor,
        path: &str,
        query: &[(&str, &str)],
        lookup: impl Fn(&str) -> Option<&'a str> + Copy,
    ) -> Result<Self, TemplateError> {
        let mut url = provider.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TemplateError::CannotBeBase {
                    base_url: provider.base_url.to_string(),
                })?;
            segments.pop_if_empty();
            for template in path.split('/').filter(|s| !s.is_empty()) {
                let segment = render(template, lookup)?;
                if is_dot_segment(&segment) {
                    return Err(TemplateError::DotSegment {
                        segment,
                        template: path.to_string(),
                    });
                }
                segments.push(&segment);
            }
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, template) in query {
                pairs.append_pair(name, &render(template, lookup)?);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        provider.authorize(&mut url, &mut headers)?;

        Ok(Self {
            provider: provider.id,
            url,
            headers,
            secret_query_param: provider.secret_query_param(),
        })
    }

    /// URL with any credential query value masked, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some(secret) = self.secret_query_param else {
            return self.url.to_string();
        };
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == secret { "***".into() } else { v };
                (k.into_owned(), v.into_owned())
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

impl fmt::Debug for OutboundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundCall")
            .field("provider", &self.provider)
            .field("url", &self.redacted_url())
            .finish()
    }
}

/// Raw provider reply: status code and body text, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The call never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Network capability used by the adapters: request in, response or error out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: create_http_client_with_timeout(timeout_seconds)?,
        })
    }
}

/// Creates an HTTP client with connection pooling, the gateway user agent and
/// a request timeout.
///
/// # Arguments
/// * `timeout_seconds` - Per-request timeout applied to every provider call
///
/// # Returns
/// * `Result<Client, reqwest::Error>` - A configured reqwest HTTP client or error
pub fn create_http_client_with_timeout(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .user_agent(crate::constants::USER_AGENT)
        .build()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(call.url.clone())
            .headers(call.headers.clone())
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", call.redacted_url(), e);
                if e.is_timeout() {
                    TransportError::Timeout
                } else if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        debug!("Response status: {status}");

        let body = response.text().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", call.redacted_url(), e);
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Other(e.to_string())
            }
        })?;
        debug!("Response length: {} bytes", body.len());

        Ok(TransportResponse { status, body })
    }
}
