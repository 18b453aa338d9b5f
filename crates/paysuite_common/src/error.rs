use std::fmt;
use thiserror::Error;

/// The base error type shared by all paysuite crates.
///
/// Gateway crates keep their own error enums and convert into this one by
/// implementing `From<SpecificError> for PaysuiteError`.
#[derive(Error, Debug)]
pub enum PaysuiteError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The payment gateway answered with a structured error
    #[error("Payment gateway declined: {code} - {message}")]
    GatewayDeclined { code: String, message: String },

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// Framework glue uses this to pick a response status without knowing the
/// concrete error type.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PaysuiteError {
    fn status_code(&self) -> u16 {
        match self {
            PaysuiteError::ParseError(_) => 502,
            PaysuiteError::ConfigError(_) => 500,
            PaysuiteError::ValidationError(_) => 400,
            PaysuiteError::GatewayDeclined { .. } => 402,
            PaysuiteError::ExternalServiceError { .. } => 502,
            PaysuiteError::InternalError(_) => 500,
        }
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> PaysuiteError {
    PaysuiteError::ConfigError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> PaysuiteError {
    PaysuiteError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
