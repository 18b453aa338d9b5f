// --- File: crates/paysuite_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// --- Response Format ---
/// Body format the SafetyPay gateway answers with. Sent to the gateway as the
/// `ResponseFormat` request parameter.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    #[serde(rename = "XML", alias = "xml")]
    Xml,
    #[serde(rename = "CSV", alias = "csv")]
    Csv,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported response format: {0:?} (expected XML or CSV)")]
pub struct UnknownResponseFormat(pub String);

impl ResponseFormat {
    /// Wire value of the `ResponseFormat` request parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Xml => "XML",
            ResponseFormat::Csv => "CSV",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = UnknownResponseFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XML" => Ok(ResponseFormat::Xml),
            "CSV" => Ok(ResponseFormat::Csv),
            _ => Err(UnknownResponseFormat(s.to_string())),
        }
    }
}

// --- Timestamp Exclusion ---
/// What a signature hashes when the caller asks to leave the request
/// timestamp out.
///
/// `EmptyDigest` hashes the empty string, ignoring fields and key. That is
/// what the gateway integration has always sent; whether the gateway expects
/// `FieldsAndKey` instead is still unconfirmed.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampExclusion {
    #[default]
    EmptyDigest,
    FieldsAndKey,
}

// --- SafetyPay Config ---
// The signature key is usually set to "secret_from_env" in the config file and
// injected from SAFETYPAY_SIGNATURE_KEY.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SafetypayConfig {
    #[serde(default)]
    pub response_format: ResponseFormat,
    pub token_url: String,     // Mandatory, sandbox or live "get token express" endpoint
    pub signature_key: String, // Mandatory
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub timestamp_exclusion: TimestampExclusion,
    #[serde(default = "default_button_image_url")]
    pub button_image_url: String,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_button_image_url() -> String {
    "../images/safetypay_module.png".to_string()
}

impl SafetypayConfig {
    /// Config with defaults for everything but the three values a client
    /// cannot work without.
    pub fn new(
        response_format: ResponseFormat,
        token_url: impl Into<String>,
        signature_key: impl Into<String>,
    ) -> Self {
        Self {
            response_format,
            token_url: token_url.into(),
            signature_key: signature_key.into(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            timestamp_exclusion: TimestampExclusion::default(),
            button_image_url: default_button_image_url(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_safetypay: bool,

    // --- Optional Gateway Configurations ---
    #[serde(default)]
    pub safetypay: Option<SafetypayConfig>,
}
