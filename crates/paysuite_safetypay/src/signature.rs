// --- File: crates/paysuite_safetypay/src/signature.rs ---
//! Request timestamp and SHA-256 request signature.

use chrono::{DateTime, Local, TimeZone};
use paysuite_config::TimestampExclusion;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SafetypayError;

/// Request parameters as sent to the gateway, ordered by name.
pub type RequestParameters = BTreeMap<String, String>;

/// `YYYY-MM-DDTHH:MM:SS±HH:MM`, the `RequestDateTime` format SafetyPay signs.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Timestamp captured once per client and reused by every signature it makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTimestamp(String);

impl RequestTimestamp {
    /// Current local time with its UTC offset.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        RequestTimestamp(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Wraps an already formatted value, e.g. one replayed from a log.
    pub fn from_formatted(value: impl Into<String>) -> Self {
        RequestTimestamp(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concatenates the values of the comma-separated `field_list`, in list order.
///
/// Names are trimmed and empty names are skipped, so `"a, b,"` reads `a`
/// then `b`.
pub fn concat_fields(params: &RequestParameters, field_list: &str) -> Result<String, SafetypayError> {
    let mut concatenated = String::new();
    for name in field_list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let value = params.get(name).ok_or_else(|| SafetypayError::MissingField {
            field: name.to_string(),
        })?;
        concatenated.push_str(value);
    }
    Ok(concatenated)
}

/// Lowercase hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Computes the request signature.
///
/// With the timestamp included the digest input is
/// `timestamp + field values + signature_key`. With it excluded the input
/// depends on `exclusion`: the empty string, or `field values + key`.
pub fn compute_signature(
    params: &RequestParameters,
    field_list: &str,
    timestamp: &RequestTimestamp,
    signature_key: &str,
    exclude_timestamp: bool,
    exclusion: TimestampExclusion,
) -> Result<String, SafetypayError> {
    let concatenated = concat_fields(params, field_list)?;

    let input = match (exclude_timestamp, exclusion) {
        (false, _) => format!("{}{}{}", timestamp, concatenated, signature_key),
        (true, TimestampExclusion::EmptyDigest) => String::new(),
        (true, TimestampExclusion::FieldsAndKey) => format!("{}{}", concatenated, signature_key),
    };

    Ok(sha256_hex(&input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn params(pairs: &[(&str, &str)]) -> RequestParameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fixed_timestamp() -> RequestTimestamp {
        RequestTimestamp::from_formatted("2024-03-01T10:15:30-05:00")
    }

    fn is_lower_hex_64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn test_timestamp_negative_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap();
        assert_eq!(
            RequestTimestamp::from_datetime(&dt).as_str(),
            "2024-03-01T10:15:30-05:00"
        );
    }

    #[test]
    fn test_timestamp_positive_and_zero_offset() {
        let tz = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let dt = tz.with_ymd_and_hms(2024, 12, 31, 23, 59, 1).unwrap();
        assert_eq!(
            RequestTimestamp::from_datetime(&dt).as_str(),
            "2024-12-31T23:59:01+05:30"
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            RequestTimestamp::from_datetime(&dt).as_str(),
            "2025-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_timestamp_now_shape() {
        let ts = RequestTimestamp::now();
        let s = ts.as_str();
        assert_eq!(s.len(), 25, "unexpected timestamp {}", s);
        assert_eq!(&s[10..11], "T");
        assert!(&s[19..20] == "+" || &s[19..20] == "-");
        assert_eq!(&s[22..23], ":");
    }

    #[test]
    fn test_signature_concatenates_in_list_order() {
        let p = params(&[("a", "1"), ("b", "2")]);
        let ts = fixed_timestamp();
        let sig = compute_signature(&p, "a,b", &ts, "secret", false, TimestampExclusion::EmptyDigest)
            .unwrap();
        assert_eq!(sig, sha256_hex("2024-03-01T10:15:30-05:0012secret"));

        let reversed =
            compute_signature(&p, "b, a", &ts, "secret", false, TimestampExclusion::EmptyDigest)
                .unwrap();
        assert_eq!(reversed, sha256_hex("2024-03-01T10:15:30-05:0021secret"));
    }

    #[test]
    fn test_signature_is_deterministic_hex() {
        let p = params(&[("Amount", "100.00"), ("CurrencyID", "USD")]);
        let ts = fixed_timestamp();
        let first = compute_signature(&p, " CurrencyID ,Amount", &ts, "k", false, TimestampExclusion::EmptyDigest)
            .unwrap();
        let second = compute_signature(&p, " CurrencyID ,Amount", &ts, "k", false, TimestampExclusion::EmptyDigest)
            .unwrap();
        assert_eq!(first, second);
        assert!(is_lower_hex_64(&first));
    }

    #[test]
    fn test_signature_excluding_timestamp_hashes_empty_string() {
        // Fields and key are ignored entirely; kept until the gateway confirms
        // what it expects here.
        let p = params(&[("a", "1")]);
        let sig = compute_signature(&p, "a", &fixed_timestamp(), "secret", true, TimestampExclusion::EmptyDigest)
            .unwrap();
        assert_eq!(sig, SHA256_EMPTY);
    }

    #[test]
    fn test_signature_excluding_timestamp_fields_and_key() {
        let p = params(&[("a", "1"), ("b", "2")]);
        let sig = compute_signature(&p, "a,b", &fixed_timestamp(), "secret", true, TimestampExclusion::FieldsAndKey)
            .unwrap();
        assert_eq!(sig, sha256_hex("12secret"));
    }

    #[test]
    fn test_signature_missing_field() {
        let p = params(&[("a", "1")]);
        let err = compute_signature(&p, "a,Amount", &fixed_timestamp(), "k", false, TimestampExclusion::EmptyDigest)
            .unwrap_err();
        assert!(matches!(err, SafetypayError::MissingField { ref field } if field == "Amount"));
    }

    #[test]
    fn test_empty_field_list_signs_timestamp_and_key() {
        let ts = fixed_timestamp();
        let sig = compute_signature(&RequestParameters::new(), "", &ts, "k", false, TimestampExclusion::EmptyDigest)
            .unwrap();
        assert_eq!(sig, sha256_hex("2024-03-01T10:15:30-05:00k"));
    }
}
