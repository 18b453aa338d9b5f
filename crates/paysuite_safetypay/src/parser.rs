// --- File: crates/paysuite_safetypay/src/parser.rs ---
//! Turns a SafetyPay token response body into a [`GatewayResult`].

use paysuite_common::GatewayResult;
use paysuite_config::ResponseFormat;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use tracing::debug;

use crate::error::SafetypayError;

const TAG_ERROR_NUMBER: &str = "ErrorNumber";
const TAG_DESCRIPTION: &str = "Description";
const TAG_REDIRECT_URL: &str = "ClientRedirectURL";

const CSV_INVALID_CREDENTIALS: &str = "Invalid credentials";
const CSV_NO_MERCHANT_DATA: &str = "Merchant has not sent data";

/// Parses `body` according to `format`.
pub fn parse_response(format: ResponseFormat, body: &str) -> Result<GatewayResult, SafetypayError> {
    match format {
        ResponseFormat::Xml => parse_xml(body),
        ResponseFormat::Csv => parse_csv(body),
    }
}

/// `<ErrorNumber>` 0 means success and `<ClientRedirectURL>` carries the
/// token URL; anything else is an error described by `<Description>`.
/// Only the first occurrence of each tag counts.
pub fn parse_xml(body: &str) -> Result<GatewayResult, SafetypayError> {
    let mut fields =
        first_element_texts(body, &[TAG_ERROR_NUMBER, TAG_DESCRIPTION, TAG_REDIRECT_URL])?;

    let error_number = fields
        .remove(TAG_ERROR_NUMBER)
        .ok_or_else(|| SafetypayError::parse("missing <ErrorNumber> element"))?;
    let code = error_number.trim().to_string();
    let numeric: i64 = code.parse().map_err(|_| {
        SafetypayError::parse(format!("<ErrorNumber> is not an integer: {:?}", code))
    })?;

    if numeric != 0 {
        let message = fields.remove(TAG_DESCRIPTION).unwrap_or_default();
        debug!(code = %code, message = %message, "SafetyPay XML error response");
        return Ok(GatewayResult::Failure { code, message });
    }

    let redirect_url = fields
        .remove(TAG_REDIRECT_URL)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| SafetypayError::parse("success response without <ClientRedirectURL>"))?;

    Ok(GatewayResult::Success { redirect_url })
}

/// Collects the content of the first element with each of the given local
/// names. Attributes and namespaces on the element are ignored. Markup nested
/// inside a captured element is kept as written, and only the outer
/// whitespace is trimmed.
fn first_element_texts<'t>(
    body: &str,
    tags: &[&'t str],
) -> Result<HashMap<&'t str, String>, SafetypayError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(false);

    let mut found: HashMap<&'t str, String> = HashMap::new();
    // (tag, content so far, nesting depth below the captured element)
    let mut capturing: Option<(&'t str, String, usize)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            SafetypayError::parse(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match capturing.as_mut() {
                Some((_, text, depth)) => {
                    *depth += 1;
                    text.push('<');
                    text.push_str(&String::from_utf8_lossy(&e));
                    text.push('>');
                }
                None => {
                    let local = e.local_name();
                    if let Some(tag) = tags.iter().find(|t| t.as_bytes() == local.as_ref()) {
                        if !found.contains_key(tag) {
                            capturing = Some((*tag, String::new(), 0));
                        }
                    }
                }
            },
            Event::Empty(e) => match capturing.as_mut() {
                Some((_, text, _)) => {
                    text.push('<');
                    text.push_str(&String::from_utf8_lossy(&e));
                    text.push_str("/>");
                }
                None => {
                    let local = e.local_name();
                    if let Some(tag) = tags.iter().find(|t| t.as_bytes() == local.as_ref()) {
                        found.entry(*tag).or_default();
                    }
                }
            },
            Event::Text(e) => {
                if let Some((_, text, _)) = capturing.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| SafetypayError::parse(format!("XML decode error: {}", e)))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some((_, text, _)) = capturing.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => match capturing.as_mut() {
                Some((_, text, depth)) if *depth > 0 => {
                    *depth -= 1;
                    text.push_str("</");
                    text.push_str(&String::from_utf8_lossy(&e));
                    text.push('>');
                }
                Some(_) => {
                    if let Some((tag, text, _)) = capturing.take() {
                        found.insert(tag, text.trim().to_string());
                    }
                }
                None => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found)
}

/// At most four comma separated fields; the first is the status.
/// `0` carries the token URL in the third field, `1` means bad credentials,
/// anything else means the merchant sent no data.
pub fn parse_csv(body: &str) -> Result<GatewayResult, SafetypayError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(SafetypayError::parse("empty CSV response"));
    }

    let fields: Vec<&str> = body.splitn(4, ',').map(str::trim).collect();

    match fields[0] {
        "0" => {
            let redirect_url = fields
                .get(2)
                .filter(|url| !url.is_empty())
                .ok_or_else(|| SafetypayError::parse("success CSV response without redirect URL"))?;
            Ok(GatewayResult::Success {
                redirect_url: redirect_url.to_string(),
            })
        }
        "1" => Ok(GatewayResult::Failure {
            code: "1".to_string(),
            message: CSV_INVALID_CREDENTIALS.to_string(),
        }),
        other => {
            debug!(status = %other, "SafetyPay CSV response with unknown status");
            Ok(GatewayResult::Failure {
                code: "2".to_string(),
                message: CSV_NO_MERCHANT_DATA.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(url: &str) -> GatewayResult {
        GatewayResult::Success {
            redirect_url: url.to_string(),
        }
    }

    fn failure(code: &str, message: &str) -> GatewayResult {
        GatewayResult::Failure {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_xml_success() {
        let body = "<ErrorNumber>0</ErrorNumber><ClientRedirectURL>http://x</ClientRedirectURL>";
        assert_eq!(parse_xml(body).unwrap(), success("http://x"));
    }

    #[test]
    fn test_xml_failure() {
        let body = "<ErrorNumber>5</ErrorNumber><Description>Bad</Description>";
        assert_eq!(parse_xml(body).unwrap(), failure("5", "Bad"));
    }

    #[test]
    fn test_xml_full_document_with_attributes_and_entities() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<ExpressTokenResponse xmlns="urn:safetypay:messages">
  <ResponseDateTime>2024-03-01T10:15:31-05:00</ResponseDateTime>
  <ClientRedirectURL>https://sandbox.example/Express/Token.aspx?TokenID=abc&amp;lang=en</ClientRedirectURL>
  <ErrorManager>
    <ErrorNumber Severity="0">0</ErrorNumber>
    <Description>No Error</Description>
  </ErrorManager>
</ExpressTokenResponse>"#;
        assert_eq!(
            parse_xml(body).unwrap(),
            success("https://sandbox.example/Express/Token.aspx?TokenID=abc&lang=en")
        );
    }

    #[test]
    fn test_xml_first_occurrence_wins() {
        let body = "<r><ErrorNumber>3</ErrorNumber><ErrorNumber>0</ErrorNumber>\
                    <Description>First</Description><Description>Second</Description></r>";
        assert_eq!(parse_xml(body).unwrap(), failure("3", "First"));
    }

    #[test]
    fn test_xml_failure_without_description() {
        let body = "<ErrorNumber>12</ErrorNumber>";
        assert_eq!(parse_xml(body).unwrap(), failure("12", ""));
    }

    #[test]
    fn test_xml_description_keeps_nested_markup_and_spacing() {
        let body = "<ErrorNumber>7</ErrorNumber>\
                    <Description>\n  Bad <b>x</b> more <br/>text\n</Description>";
        assert_eq!(
            parse_xml(body).unwrap(),
            failure("7", "Bad <b>x</b> more <br/>text")
        );
    }

    #[test]
    fn test_xml_cdata_redirect() {
        let body = "<ErrorNumber>0</ErrorNumber><ClientRedirectURL><![CDATA[http://y?a=1&b=2]]></ClientRedirectURL>";
        assert_eq!(parse_xml(body).unwrap(), success("http://y?a=1&b=2"));
    }

    #[test]
    fn test_xml_missing_error_number_is_parse_error() {
        let err = parse_xml("<html><body>Service Unavailable</body></html>").unwrap_err();
        assert!(matches!(err, SafetypayError::Parse(ref m) if m.contains("ErrorNumber")));
    }

    #[test]
    fn test_xml_non_numeric_error_number_is_parse_error() {
        let err = parse_xml("<ErrorNumber>abc</ErrorNumber>").unwrap_err();
        assert!(matches!(err, SafetypayError::Parse(_)));
    }

    #[test]
    fn test_xml_success_without_redirect_is_parse_error() {
        let err = parse_xml("<ErrorNumber>0</ErrorNumber><Description>No Error</Description>").unwrap_err();
        assert!(matches!(err, SafetypayError::Parse(ref m) if m.contains("ClientRedirectURL")));
    }

    #[test]
    fn test_xml_mismatched_tags_is_parse_error() {
        let err = parse_xml("<ErrorNumber>0</Description>").unwrap_err();
        assert!(matches!(err, SafetypayError::Parse(ref m) if m.contains("malformed XML")));
    }

    #[test]
    fn test_csv_success() {
        assert_eq!(
            parse_csv("0,ignored,http://y,extra").unwrap(),
            success("http://y")
        );
    }

    #[test]
    fn test_csv_success_keeps_commas_after_fourth_field() {
        assert_eq!(
            parse_csv("0,2024-03-01T10:15:31,http://y,a,b,c\r\n").unwrap(),
            success("http://y")
        );
    }

    #[test]
    fn test_csv_invalid_credentials() {
        assert_eq!(parse_csv("1,x,y").unwrap(), failure("1", "Invalid credentials"));
    }

    #[test]
    fn test_csv_other_status() {
        assert_eq!(parse_csv("2").unwrap(), failure("2", "Merchant has not sent data"));
        assert_eq!(parse_csv("7,x").unwrap(), failure("2", "Merchant has not sent data"));
    }

    #[test]
    fn test_csv_empty_body_is_parse_error() {
        assert!(matches!(parse_csv("  \r\n").unwrap_err(), SafetypayError::Parse(_)));
    }

    #[test]
    fn test_csv_success_without_url_is_parse_error() {
        assert!(matches!(parse_csv("0,only").unwrap_err(), SafetypayError::Parse(_)));
        assert!(matches!(parse_csv("0,x,").unwrap_err(), SafetypayError::Parse(_)));
    }

    #[test]
    fn test_parse_response_dispatch() {
        assert_eq!(
            parse_response(ResponseFormat::Csv, "0,a,http://c").unwrap(),
            success("http://c")
        );
        assert_eq!(
            parse_response(
                ResponseFormat::Xml,
                "<ErrorNumber>0</ErrorNumber><ClientRedirectURL>http://x</ClientRedirectURL>"
            )
            .unwrap(),
            success("http://x")
        );
    }
}
