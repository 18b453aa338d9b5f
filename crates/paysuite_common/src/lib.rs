// --- File: crates/paysuite_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;     // Error handling
pub mod http;      // HTTP client utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    PaysuiteError,
    HttpStatusCode,
    config_error,
    external_service_error,
};

// Re-export HTTP utilities for easier access
pub use http::client::create_client_with_timeouts;

// Re-export logging utilities for easier access
pub use logging::{
    init,
    init_with_level,
    log_error,
    log_result,
};

pub use services::{BoxFuture, GatewayResult, PaymentRedirectService};

// This crate provides functionality shared by every payment gateway crate:
// the common error taxonomy, logging bootstrap, HTTP client construction and
// the service trait framework glue calls into.
