// --- File: crates/paysuite_common/src/services.rs ---
//! Service abstractions for payment gateways.
//!
//! Framework glue (controllers, template helpers) depends on these traits
//! instead of a concrete gateway, so a gateway can be swapped or faked in
//! tests without touching the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Outcome of a redirect/token request that reached the gateway.
///
/// Transport problems are not represented here; they surface as the
/// service's error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GatewayResult {
    /// The gateway issued a URL the customer must be sent to.
    Success { redirect_url: String },
    /// The gateway rejected the request.
    Failure { code: String, message: String },
}

/// A payment gateway that answers a parameter set with a redirect URL.
///
/// Parameter names and values are gateway specific; the map is ordered so
/// the encoded form body is deterministic.
pub trait PaymentRedirectService: Send + Sync {
    /// Error type returned by the service.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Request a redirect URL for the given parameters.
    fn request_redirect(
        &self,
        params: BTreeMap<String, String>,
    ) -> BoxFuture<'_, GatewayResult, Self::Error>;
}
