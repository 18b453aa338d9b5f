// --- File: crates/paysuite_safetypay/src/render.rs ---
//! Presentation of a [`GatewayResult`] for templates.
//!
//! Parsing never produces markup; callers that want the SafetyPay button pick
//! [`LinkStyle::Html`] here.

use html_escape::{encode_double_quoted_attribute, encode_text};
use paysuite_common::GatewayResult;

/// How a result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Success becomes a clickable SafetyPay button, failure a red span.
    Html,
    /// Success is the bare redirect URL, failure plain text.
    Bare,
}

impl LinkStyle {
    pub fn from_want_html_link(want_html_link: bool) -> Self {
        if want_html_link {
            LinkStyle::Html
        } else {
            LinkStyle::Bare
        }
    }
}

/// Renders `result` in the given style. `button_image_url` is only used for
/// an HTML success link.
pub fn render_result(result: &GatewayResult, style: LinkStyle, button_image_url: &str) -> String {
    match (result, style) {
        (GatewayResult::Success { redirect_url }, LinkStyle::Bare) => redirect_url.clone(),
        (GatewayResult::Success { redirect_url }, LinkStyle::Html) => format!(
            r#"<a href="{}" target="_blank"><img src="{}" border="0" alt="SafetyPay Inc." /></a>"#,
            encode_double_quoted_attribute(redirect_url),
            encode_double_quoted_attribute(button_image_url),
        ),
        (GatewayResult::Failure { code, message }, LinkStyle::Bare) => {
            format!("Error: ({}) {}", code, message)
        }
        (GatewayResult::Failure { code, message }, LinkStyle::Html) => format!(
            r#"<span style="color:red;">Error: ({}) {}</span>"#,
            encode_text(code),
            encode_text(message),
        ),
    }
}
