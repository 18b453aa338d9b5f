use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Creates a new HTTP client with separate connect and total request timeouts.
///
/// Gateways that answer a POST with a redirect expect the caller to follow it
/// in the browser, so payment clients usually pass `follow_redirects = false`.
pub fn create_client_with_timeouts(
    connect_timeout_secs: u64,
    timeout_secs: u64,
    follow_redirects: bool,
) -> Result<Client, ReqwestError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
