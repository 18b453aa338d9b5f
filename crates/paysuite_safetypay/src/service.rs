// --- File: crates/paysuite_safetypay/src/service.rs ---
use paysuite_common::{BoxFuture, GatewayResult, PaymentRedirectService};
use paysuite_config::{AppConfig, ResponseFormat, SafetypayConfig, SECRET_FROM_ENV};
use reqwest::Url;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::SafetypayError;
use crate::parser::parse_response;
use crate::render::{render_result, LinkStyle};
use crate::signature::{compute_signature, RequestParameters, RequestTimestamp};
use crate::transport::{FormTransport, RawResponse, ReqwestTransport, TransportError};

/// Name of the request parameter that selects the response body format.
pub const RESPONSE_FORMAT_PARAM: &str = "ResponseFormat";

/// SafetyPay "get token express" client.
///
/// Holds the immutable gateway config and the request timestamp captured at
/// construction; every signature made by this manager uses that timestamp.
/// Safe to share between tasks.
pub struct SafetypayManager {
    config: SafetypayConfig,
    endpoint: Url,
    request_timestamp: RequestTimestamp,
    transport: Arc<dyn FormTransport>,
}

impl SafetypayManager {
    /// Create a manager posting through a reqwest client built from `config`.
    ///
    /// Fails when the signature key is empty or still the unresolved
    /// `secret_from_env` marker.
    pub fn new(config: SafetypayConfig) -> Result<Self, SafetypayError> {
        check_signature_key(&config.signature_key)?;
        let endpoint = parse_endpoint(&config.token_url)?;
        let transport = ReqwestTransport::from_config(&config)?;

        Ok(Self {
            config,
            endpoint,
            request_timestamp: RequestTimestamp::now(),
            transport: Arc::new(transport),
        })
    }

    /// Create a manager from the three mandatory values, defaults elsewhere.
    pub fn from_parts(
        response_format: ResponseFormat,
        token_url: impl Into<String>,
        signature_key: impl Into<String>,
    ) -> Result<Self, SafetypayError> {
        Self::new(SafetypayConfig::new(response_format, token_url, signature_key))
    }

    /// Create a manager from the application config, if SafetyPay is enabled.
    pub fn from_app_config(app_config: &AppConfig) -> Result<Self, SafetypayError> {
        if !app_config.use_safetypay {
            return Err(SafetypayError::Config("SafetyPay is disabled (use_safetypay = false)".to_string()));
        }
        let config = app_config
            .safetypay
            .clone()
            .ok_or_else(|| SafetypayError::Config("missing [safetypay] section".to_string()))?;
        Self::new(config)
    }

    /// Replace the transport, e.g. with a client that has custom TLS settings.
    pub fn with_transport(mut self, transport: impl FormTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the timestamp captured at construction.
    pub fn with_request_timestamp(mut self, request_timestamp: RequestTimestamp) -> Self {
        self.request_timestamp = request_timestamp;
        self
    }

    pub fn config(&self) -> &SafetypayConfig {
        &self.config
    }

    pub fn request_timestamp(&self) -> &RequestTimestamp {
        &self.request_timestamp
    }

    /// Signature over the values of `field_list` (comma separated, in order).
    ///
    /// See [`compute_signature`] for the digest input; with
    /// `exclude_timestamp` the configured `timestamp_exclusion` decides.
    pub fn compute_signature(
        &self,
        params: &RequestParameters,
        field_list: &str,
        exclude_timestamp: bool,
    ) -> Result<String, SafetypayError> {
        compute_signature(
            params,
            field_list,
            &self.request_timestamp,
            &self.config.signature_key,
            exclude_timestamp,
            self.config.timestamp_exclusion,
        )
    }

    /// Posts `params` to the token endpoint and parses the answer.
    ///
    /// `ResponseFormat` in `params` decides how the body is parsed; when it is
    /// absent the configured format is sent and used.
    pub async fn request_token(&self, params: &RequestParameters) -> Result<GatewayResult, SafetypayError> {
        let (format, params) = self.resolve_response_format(params)?;

        let form_body = serde_urlencoded::to_string(&*params)
            .map_err(|e| SafetypayError::Encoding(e.to_string()))?;

        let response = self.send_with_retries(form_body).await?;

        if !response.status.is_success() {
            warn!(
                status = %response.status_line(),
                "SafetyPay answered with a non-success status, parsing body anyway"
            );
        }

        let result = parse_response(format, &response.body).map_err(|e| {
            error!(format = %format, error = %e, "Unparseable SafetyPay response");
            e
        })?;

        match &result {
            GatewayResult::Success { .. } => info!("SafetyPay token issued"),
            GatewayResult::Failure { code, message } => {
                info!(code = %code, message = %message, "SafetyPay rejected token request")
            }
        }
        Ok(result)
    }

    /// [`request_token`](Self::request_token), rendered for a template.
    ///
    /// With `want_html_link` a success becomes the SafetyPay button link,
    /// otherwise the bare URL.
    pub async fn request_token_rendered(
        &self,
        params: &RequestParameters,
        want_html_link: bool,
    ) -> Result<String, SafetypayError> {
        let result = self.request_token(params).await?;
        Ok(render_result(
            &result,
            LinkStyle::from_want_html_link(want_html_link),
            &self.config.button_image_url,
        ))
    }

    fn resolve_response_format<'p>(
        &self,
        params: &'p RequestParameters,
    ) -> Result<(ResponseFormat, Cow<'p, RequestParameters>), SafetypayError> {
        match params.get(RESPONSE_FORMAT_PARAM) {
            Some(value) => {
                let format = value
                    .parse::<ResponseFormat>()
                    .map_err(|_| SafetypayError::UnsupportedResponseFormat(value.clone()))?;
                Ok((format, Cow::Borrowed(params)))
            }
            None => {
                let format = self.config.response_format;
                let mut with_format = params.clone();
                with_format.insert(RESPONSE_FORMAT_PARAM.to_string(), format.as_str().to_string());
                Ok((format, Cow::Owned(with_format)))
            }
        }
    }

    async fn send_with_retries(&self, form_body: String) -> Result<RawResponse, SafetypayError> {
        let max_attempts = self.config.max_attempts.max(1);
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);

        let mut attempt = 1;
        loop {
            debug!(
                attempt,
                max_attempts,
                host = self.endpoint.host_str().unwrap_or_default(),
                "Sending SafetyPay token request"
            );

            match self.transport.send_form_post(&self.endpoint, form_body.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        delay_ms = retry_delay.as_millis() as u64,
                        error = %e,
                        "SafetyPay connection failed, retrying"
                    );
                    if !retry_delay.is_zero() {
                        tokio::time::sleep(retry_delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempt, error = %e, "SafetyPay token request failed");
                    return Err(transport_error(attempt, e));
                }
            }
        }
    }
}

fn transport_error(attempts: u32, err: TransportError) -> SafetypayError {
    SafetypayError::Transport {
        attempts,
        message: err.to_string(),
    }
}

fn check_signature_key(key: &str) -> Result<(), SafetypayError> {
    if key.trim().is_empty() {
        return Err(SafetypayError::Config("signature_key is empty".to_string()));
    }
    if key == SECRET_FROM_ENV {
        return Err(SafetypayError::Config(
            "signature_key was not resolved, set SAFETYPAY_SIGNATURE_KEY".to_string(),
        ));
    }
    Ok(())
}

fn parse_endpoint(token_url: &str) -> Result<Url, SafetypayError> {
    let url = Url::parse(token_url)
        .map_err(|e| SafetypayError::Config(format!("invalid token_url {:?}: {}", token_url, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SafetypayError::Config(format!(
                "token_url scheme must be http or https, got {:?}",
                other
            )))
        }
    }
    if url.host_str().is_none() {
        return Err(SafetypayError::Config(format!("token_url {:?} has no host", token_url)));
    }
    Ok(url)
}

/// Converts a [`GatewayResult`] into the redirect URL or a
/// [`SafetypayError::Gateway`], for callers that prefer `?`.
pub trait GatewayResultExt {
    fn into_redirect_url(self) -> Result<String, SafetypayError>;
}

impl GatewayResultExt for GatewayResult {
    fn into_redirect_url(self) -> Result<String, SafetypayError> {
        match self {
            GatewayResult::Success { redirect_url } => Ok(redirect_url),
            GatewayResult::Failure { code, message } => Err(SafetypayError::Gateway { code, message }),
        }
    }
}

impl PaymentRedirectService for SafetypayManager {
    type Error = SafetypayError;

    fn request_redirect(
        &self,
        params: RequestParameters,
    ) -> BoxFuture<'_, GatewayResult, Self::Error> {
        Box::pin(async move { self.request_token(&params).await })
    }
}
