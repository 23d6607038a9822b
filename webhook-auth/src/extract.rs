//! Header and credential extraction.
//!
//! Parsers return `None` when a header holds no usable signature entry, so an empty or
//! garbled header is reported the same way as a missing one.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::request::Headers;

/// Proof material parsed out of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeader {
    /// `(version tag, signature)` pairs in header order.
    pub signatures: Vec<(String, String)>,
    pub timestamp: Option<String>,
    pub id: Option<String>,
}

impl SignatureHeader {
    /// Signatures whose tag is exactly `version`; other tags are ignored.
    pub fn candidates<'a>(&'a self, version: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.signatures
            .iter()
            .filter(move |(tag, _)| tag == version)
            .map(|(_, signature)| signature.as_str())
    }

    pub fn has_candidates(&self, version: &str) -> bool {
        self.candidates(version).next().is_some()
    }
}

/// Parse `key=value` lists such as Stripe's `t=1,v1=abc,v1=def` or Paddle's `ts=1;h1=abc`.
///
/// Entries named `timestamp_key` fill the timestamp; everything else is kept as a tagged
/// signature. Returns `None` unless at least one `signature_key` entry is present.
pub fn parse_key_value_list(
    value: &str,
    separator: char,
    timestamp_key: &str,
    signature_key: &str,
) -> Option<SignatureHeader> {
    let mut header = SignatureHeader::default();

    for part in value.split(separator) {
        let Some((key, item)) = part.trim().split_once('=') else {
            continue;
        };
        let (key, item) = (key.trim(), item.trim());
        if item.is_empty() {
            continue;
        }
        if key == timestamp_key {
            header.timestamp = Some(item.to_string());
        } else {
            header.signatures.push((key.to_string(), item.to_string()));
        }
    }

    header.has_candidates(signature_key).then_some(header)
}

/// Parse Standard Webhooks signature lists: space separated `version,signature` pairs.
///
/// Pairs whose version is not exactly `version` are dropped.
pub fn parse_versioned_list(value: &str, version: &str) -> Option<SignatureHeader> {
    let signatures: Vec<(String, String)> = value
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(tag, signature)| *tag == version && !signature.is_empty())
        .map(|(tag, signature)| (tag.to_string(), signature.to_string()))
        .collect();

    (!signatures.is_empty()).then(|| SignatureHeader {
        signatures,
        ..SignatureHeader::default()
    })
}

/// Split a header carrying several comma-separated signatures of one kind.
pub fn parse_comma_list(value: &str, version: &str) -> Option<SignatureHeader> {
    let signatures: Vec<(String, String)> = value
        .split(',')
        .map(str::trim)
        .filter(|signature| !signature.is_empty())
        .map(|signature| (version.to_string(), signature.to_string()))
        .collect();

    (!signatures.is_empty()).then(|| SignatureHeader {
        signatures,
        ..SignatureHeader::default()
    })
}

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &Headers) -> Option<&str> {
    let value = headers.get_non_empty("authorization")?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Decoded `user:password` from `Authorization: Basic <base64>`.
///
/// `Ok(None)` when no Basic credential is present; a present but undecodable one is malformed.
pub fn basic_credentials(headers: &Headers) -> Result<Option<String>, Error> {
    let Some(value) = headers.get_non_empty("authorization") else {
        return Ok(None);
    };
    let Some((scheme, encoded)) = value.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| {
            webhook_error(
                WebhookErrorKind::MalformedCredential,
                "invalid basic authorization encoding",
            )
        })?;

    if !decoded.contains(':') {
        return Err(webhook_error(
            WebhookErrorKind::MalformedCredential,
            "basic authorization is not user:password",
        ));
    }

    Ok(Some(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_style_header() {
        let header = parse_key_value_list("t=1700000000,v1=aaa,v1=bbb,v0=ccc", ',', "t", "v1")
            .unwrap();

        assert_eq!(header.timestamp.as_deref(), Some("1700000000"));
        assert_eq!(header.candidates("v1").collect::<Vec<_>>(), vec!["aaa", "bbb"]);
        assert_eq!(header.candidates("v0").collect::<Vec<_>>(), vec!["ccc"]);
    }

    #[test]
    fn test_paddle_style_header() {
        let header = parse_key_value_list("ts=1671552777;h1=eb4d0dc8", ';', "ts", "h1").unwrap();
        assert_eq!(header.timestamp.as_deref(), Some("1671552777"));
        assert_eq!(header.candidates("h1").collect::<Vec<_>>(), vec!["eb4d0dc8"]);
    }

    #[test]
    fn test_header_without_expected_signature_is_absent() {
        assert_eq!(parse_key_value_list("t=1,v0=abc", ',', "t", "v1"), None);
        assert_eq!(parse_key_value_list("garbage", ',', "t", "v1"), None);
        assert_eq!(parse_key_value_list("", ',', "t", "v1"), None);
    }

    #[test]
    fn test_versioned_list_keeps_exact_version_only() {
        let header = parse_versioned_list("v1,abc v2,def v1a,ghi v1,jkl", "v1").unwrap();
        assert_eq!(header.candidates("v1").collect::<Vec<_>>(), vec!["abc", "jkl"]);
    }

    #[test]
    fn test_versioned_list_without_match_is_absent() {
        assert_eq!(parse_versioned_list("v2,abc", "v1"), None);
        assert_eq!(parse_versioned_list("abc", "v1"), None);
    }

    #[test]
    fn test_comma_list() {
        let header = parse_comma_list("sig1, sig2,", "ecdsa").unwrap();
        assert_eq!(header.candidates("ecdsa").collect::<Vec<_>>(), vec!["sig1", "sig2"]);
        assert_eq!(parse_comma_list(" , ", "ecdsa"), None);
    }

    #[test]
    fn test_bearer_token() {
        let headers = Headers::new().with("Authorization", "Bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));

        let headers = Headers::new().with("Authorization", "Basic abc123");
        assert_eq!(bearer_token(&headers), None);

        let headers = Headers::new().with("Authorization", "Bearer ");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_basic_credentials() {
        let encoded = STANDARD.encode("user:pa:ss");
        let headers = Headers::new().with("authorization", format!("Basic {}", encoded));
        assert_eq!(basic_credentials(&headers).unwrap().as_deref(), Some("user:pa:ss"));

        let headers = Headers::new().with("authorization", "Basic ***");
        let err = basic_credentials(&headers).unwrap_err();
        assert_eq!(err.reason(), WebhookErrorKind::MalformedCredential);

        assert_eq!(basic_credentials(&Headers::new()).unwrap(), None);
    }
}
