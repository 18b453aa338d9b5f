use paysuite_common::{external_service_error, HttpStatusCode, PaysuiteError};
use thiserror::Error;

/// SafetyPay-specific error types.
#[derive(Error, Debug)]
pub enum SafetypayError {
    /// Every connection attempt to the gateway failed, or a failure that
    /// retrying cannot fix
    #[error("SafetyPay gateway unreachable after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// The response body did not have the expected shape
    #[error("Failed to parse SafetyPay response: {0}")]
    Parse(String),

    /// A field named in the signature list is absent from the request parameters
    #[error("Signature field '{field}' missing from request parameters")]
    MissingField { field: String },

    /// `ResponseFormat` parameter is neither XML nor CSV
    #[error("Unsupported SafetyPay response format: {0:?}")]
    UnsupportedResponseFormat(String),

    /// The gateway answered with an error code
    #[error("SafetyPay returned an error: ({code}) {message}")]
    Gateway { code: String, message: String },

    /// Request parameters could not be form encoded
    #[error("Failed to encode request body: {0}")]
    Encoding(String),

    /// Missing or invalid SafetyPay configuration
    #[error("SafetyPay configuration error: {0}")]
    Config(String),
}

impl SafetypayError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        SafetypayError::Parse(message.into())
    }
}

/// Convert SafetypayError to PaysuiteError
impl From<SafetypayError> for PaysuiteError {
    fn from(err: SafetypayError) -> Self {
        match err {
            SafetypayError::Transport { attempts, message } => external_service_error(
                "SafetyPay",
                format!("unreachable after {} attempt(s): {}", attempts, message),
            ),
            SafetypayError::Parse(msg) => PaysuiteError::ParseError(format!("SafetyPay response: {}", msg)),
            SafetypayError::MissingField { field } => PaysuiteError::ValidationError(format!(
                "signature field '{}' missing from request parameters",
                field
            )),
            SafetypayError::UnsupportedResponseFormat(format) => {
                PaysuiteError::ValidationError(format!("unsupported response format {:?}", format))
            }
            SafetypayError::Gateway { code, message } => PaysuiteError::GatewayDeclined { code, message },
            SafetypayError::Encoding(msg) => PaysuiteError::InternalError(format!("SafetyPay request encoding: {}", msg)),
            SafetypayError::Config(msg) => PaysuiteError::ConfigError(format!("SafetyPay: {}", msg)),
        }
    }
}

impl HttpStatusCode for SafetypayError {
    fn status_code(&self) -> u16 {
        match self {
            SafetypayError::Transport { .. } => 502,
            SafetypayError::Parse(_) => 502,
            SafetypayError::MissingField { .. } => 400,
            SafetypayError::UnsupportedResponseFormat(_) => 400,
            SafetypayError::Gateway { .. } => 402,
            SafetypayError::Encoding(_) => 500,
            SafetypayError::Config(_) => 500,
        }
    }
}
