// --- File: crates/paysuite_safetypay/src/transport.rs ---
//! HTTP transport used to post the token request.
//!
//! The manager only needs "post this form body, give me status, headers and
//! body back", so that is the whole trait. [`ReqwestTransport`] is the
//! production implementation; tests plug in their own.

use http::header::{CONNECTION, CONTENT_TYPE};
use http::{HeaderMap, StatusCode, Version};
use paysuite_common::{create_client_with_timeouts, BoxFuture};
use paysuite_config::SafetypayConfig;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use crate::error::SafetypayError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Failure of a single transport attempt.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not establish a connection (DNS, refused, TLS handshake)
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request was sent but no complete answer arrived in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure once the connection was up
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether another attempt may succeed without the gateway having seen
    /// the request already. Only failures before the POST went out qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Raw gateway answer, before any format specific parsing.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub version: Version,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// e.g. `HTTP/1.1 200 OK`
    pub fn status_line(&self) -> String {
        format!(
            "{:?} {} {}",
            self.version,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    }
}

/// Sends a form-encoded POST and returns the complete response.
pub trait FormTransport: Send + Sync {
    fn send_form_post<'a>(
        &'a self,
        url: &'a Url,
        form_body: String,
    ) -> BoxFuture<'a, RawResponse, TransportError>;
}

/// [`FormTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client with the configured connect/request timeouts and redirects
    /// disabled.
    pub fn from_config(config: &SafetypayConfig) -> Result<Self, SafetypayError> {
        let client = create_client_with_timeouts(
            config.connect_timeout_secs,
            config.request_timeout_secs,
            false,
        )
        .map_err(|e| SafetypayError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client))
    }
}

impl FormTransport for ReqwestTransport {
    fn send_form_post<'a>(
        &'a self,
        url: &'a Url,
        form_body: String,
    ) -> BoxFuture<'a, RawResponse, TransportError> {
        Box::pin(async move {
            debug!(url = %url, body_len = form_body.len(), "POST form");

            let response = self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header(CONNECTION, "close")
                .body(form_body)
                .send()
                .await?;

            let version = response.version();
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            Ok(RawResponse {
                version,
                status,
                headers,
                body,
            })
        })
    }
}
