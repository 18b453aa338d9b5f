// --- File: crates/paysuite_safetypay/src/lib.rs ---

pub mod error;
pub mod parser;
pub mod render;
pub mod service;
pub mod signature;
pub mod transport;

pub use error::SafetypayError; // Re-export the error type
pub use paysuite_common::GatewayResult;
pub use paysuite_config::{ResponseFormat, SafetypayConfig, TimestampExclusion};
pub use render::{render_result, LinkStyle};
pub use service::{GatewayResultExt, SafetypayManager, RESPONSE_FORMAT_PARAM};
pub use signature::{RequestParameters, RequestTimestamp};
pub use transport::{FormTransport, RawResponse, ReqwestTransport, TransportError};
