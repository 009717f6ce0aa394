//! Per-request signing for the Data Collector API.
//!
//! Every request carries an `Authorization: SharedKey <id>:<sig>` header
//! where `<sig>` is the base64 HMAC-SHA256 of a canonical description of
//! the request, keyed with the decoded shared secret.

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::PublishError;

type HmacSha256 = Hmac<Sha256>;

pub const HTTP_METHOD: &str = "POST";
pub const CONTENT_TYPE: &str = "application/json";
pub const RESOURCE_PATH: &str = "/api/logs";

/// Format an instant per RFC 1123, e.g. `Mon, 01 Jan 2018 00:00:00 GMT`.
///
/// The same string goes into the `x-ms-date` header and the canonical
/// string; callers must compute it once and reuse it, a recompute between
/// the two would skew them and invalidate the signature.
pub fn rfc1123(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Canonical string-to-sign: five `\n`-separated segments in fixed order.
///
/// `content_length` is the byte length of the body as transmitted, not a
/// character count. Zero is valid for an empty body.
pub fn canonical_string(
    method: &str,
    content_length: usize,
    content_type: &str,
    date: &str,
    resource: &str,
) -> String {
    format!(
        "{}\n{}\n{}\nx-ms-date:{}\n{}",
        method, content_length, content_type, date, resource
    )
}

/// Per-request signing inputs. Built fresh for every publish attempt and
/// dropped with it, never persisted.
pub struct SigningContext<'a> {
    pub customer_id: &'a str,
    /// Base64-encoded shared secret.
    pub shared_key: &'a str,
    /// RFC 1123 UTC send time, shared with the `x-ms-date` header.
    pub x_ms_date: &'a str,
    /// Byte length of the serialized body.
    pub content_length: usize,
}

impl SigningContext<'_> {
    /// Compute the `Authorization` header value.
    ///
    /// **Returns**
    /// - `Ok(..)` with `"SharedKey {customerId}:{base64Signature}"`.
    /// - `Err(PublishError::Configuration)` if the shared key is not
    ///   valid standard base64.
    pub fn authorization(&self) -> Result<String, PublishError> {
        let key = general_purpose::STANDARD.decode(self.shared_key).map_err(|e| {
            PublishError::Configuration(format!("shared key is not valid base64: {}", e))
        })?;

        let message = canonical_string(
            HTTP_METHOD,
            self.content_length,
            CONTENT_TYPE,
            self.x_ms_date,
            RESOURCE_PATH,
        );

        let mut mac =
            HmacSha256::new_from_slice(&key).expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        let digest = mac.finalize().into_bytes();

        Ok(format!(
            "SharedKey {}:{}",
            self.customer_id,
            general_purpose::STANDARD.encode(digest)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ZERO_KEY: &str =
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==";
    const FIXED_DATE: &str = "Mon, 01 Jan 2018 00:00:00 GMT";

    #[test]
    fn rfc1123_matches_expected_shape() {
        let instant = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(rfc1123(instant), FIXED_DATE);
    }

    #[test]
    fn canonical_string_is_exact() {
        let canonical =
            canonical_string("POST", 2, "application/json", FIXED_DATE, "/api/logs");
        assert_eq!(
            canonical,
            "POST\n2\napplication/json\nx-ms-date:Mon, 01 Jan 2018 00:00:00 GMT\n/api/logs"
        );

        let segments: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(segments.len(), 5);
        assert!(segments[3].starts_with("x-ms-date:"));
    }

    #[test]
    fn canonical_string_accepts_empty_body() {
        let canonical =
            canonical_string("POST", 0, "application/json", FIXED_DATE, "/api/logs");
        assert!(canonical.starts_with("POST\n0\n"));
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let body = "café";
        assert_eq!(body.chars().count(), 4);
        assert_eq!(body.len(), 5);
        let canonical =
            canonical_string("POST", body.len(), "application/json", FIXED_DATE, "/api/logs");
        assert!(canonical.starts_with("POST\n5\n"));
    }

    #[test]
    fn signature_matches_known_answer() {
        let context = SigningContext {
            customer_id: "workspace",
            shared_key: ZERO_KEY,
            x_ms_date: FIXED_DATE,
            content_length: 2,
        };
        assert_eq!(
            context.authorization().unwrap(),
            "SharedKey workspace:TiAcRGSoMzTPLKxmxjbX1qRsFJNBz5x9mOE43Pi5Gco="
        );
    }

    #[test]
    fn signature_is_deterministic() {
        let context = SigningContext {
            customer_id: "workspace",
            shared_key: ZERO_KEY,
            x_ms_date: FIXED_DATE,
            content_length: 42,
        };
        assert_eq!(
            context.authorization().unwrap(),
            context.authorization().unwrap()
        );
    }

    #[test]
    fn invalid_base64_key_is_a_configuration_error() {
        let context = SigningContext {
            customer_id: "workspace",
            shared_key: "not base64!!",
            x_ms_date: FIXED_DATE,
            content_length: 0,
        };
        let err = context.authorization().unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)), "{:?}", err);
    }
}
