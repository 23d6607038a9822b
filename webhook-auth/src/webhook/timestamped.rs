//! Timestamped HMAC schemes (Stripe, ElevenLabs, Paddle, Webflow).

use async_trait::async_trait;

use super::{match_candidates, required_header, Scheme, SchemeVerifier};
use crate::compute::{compute_mac, MacAlgorithm, SignatureEncoding};
use crate::content::CanonicalContent;
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::extract::parse_key_value_list;
use crate::freshness::ReplayWindow;
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;

/// Where the timestamp and signatures are carried.
#[derive(Debug, Clone)]
pub enum TimestampLayout {
    /// One header holding `key=value` entries, e.g. `t=...,v1=...`.
    Combined {
        header: String,
        separator: char,
        timestamp_key: String,
        signature_key: String,
    },
    /// Signature and timestamp in separate headers.
    Split {
        signature_header: String,
        timestamp_header: String,
    },
}

impl TimestampLayout {
    pub fn combined(header: &str, separator: char, timestamp_key: &str, signature_key: &str) -> Self {
        TimestampLayout::Combined {
            header: header.to_string(),
            separator,
            timestamp_key: timestamp_key.to_string(),
            signature_key: signature_key.to_string(),
        }
    }

    pub fn split(signature_header: &str, timestamp_header: &str) -> Self {
        TimestampLayout::Split {
            signature_header: signature_header.to_string(),
            timestamp_header: timestamp_header.to_string(),
        }
    }

    /// Timestamp and candidate signatures, exactly as sent.
    fn extract(&self, request: &VerificationRequest) -> Result<(String, Vec<String>), Error> {
        match self {
            TimestampLayout::Combined {
                header,
                separator,
                timestamp_key,
                signature_key,
            } => {
                let value = required_header(request, header)?;
                let parsed = parse_key_value_list(value, *separator, timestamp_key, signature_key)
                    .ok_or_else(|| {
                        webhook_error(
                            WebhookErrorKind::MissingCredential,
                            &format!("no {} signature in {}", signature_key, header),
                        )
                    })?;
                let timestamp = parsed.timestamp.clone().ok_or_else(|| {
                    webhook_error(
                        WebhookErrorKind::MalformedCredential,
                        &format!("no {} timestamp in {}", timestamp_key, header),
                    )
                })?;
                let candidates = parsed
                    .candidates(signature_key)
                    .map(str::to_string)
                    .collect();
                Ok((timestamp, candidates))
            }
            TimestampLayout::Split {
                signature_header,
                timestamp_header,
            } => {
                let signature = required_header(request, signature_header)?;
                let timestamp = required_header(request, timestamp_header)?;
                Ok((timestamp.to_string(), vec![signature.to_string()]))
            }
        }
    }
}

/// HMAC verifier for schemes that sign a timestamp together with the body.
///
/// The shared secret is used as literal UTF-8 key bytes.
#[derive(Debug, Clone)]
pub struct TimestampedHmacVerifier {
    layout: TimestampLayout,
    content: CanonicalContent,
    algorithm: MacAlgorithm,
    encoding: SignatureEncoding,
    window: ReplayWindow,
}

impl TimestampedHmacVerifier {
    pub fn new(
        layout: TimestampLayout,
        content: CanonicalContent,
        encoding: SignatureEncoding,
        window: ReplayWindow,
    ) -> Self {
        Self {
            layout,
            content,
            algorithm: MacAlgorithm::HmacSha256,
            encoding,
            window,
        }
    }

    /// Override the replay window tolerance.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.window = self.window.with_tolerance(tolerance_secs);
        self
    }

    pub fn window(&self) -> ReplayWindow {
        self.window
    }
}

#[async_trait]
impl SchemeVerifier for TimestampedHmacVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let key = secret.shared_secret()?;
        let (timestamp, candidates) = self.layout.extract(request)?;

        self.window.check(&timestamp, request.received_at())?;

        let content = self
            .content
            .build(None, Some(timestamp.as_str()), request.body())?;
        let expected = compute_mac(self.algorithm, key.as_bytes(), &content)?;

        match_candidates(&expected, candidates.iter().map(String::as_str), self.encoding)
    }

    fn scheme(&self) -> Scheme {
        Scheme::TimestampedHmac
    }
}
