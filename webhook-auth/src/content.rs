//! Canonical signed-content builders.
//!
//! Each scheme signs a specific byte sequence; the verifier must rebuild it bit for bit
//! from the raw body and the header values exactly as sent (timestamps are not re-formatted).

use crate::error::{webhook_error, Error, WebhookErrorKind};

/// Byte layout a sender signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalContent {
    /// The raw body alone (GitHub, Shopify, WooCommerce, Vercel, Hookdeck, Cursor).
    Body,
    /// `{timestamp}.{body}` (Stripe, ElevenLabs).
    TimestampDotBody,
    /// `{timestamp}:{body}` (Webflow, Paddle).
    TimestampColonBody,
    /// `{timestamp}{body}` with no separator (SendGrid).
    TimestampBody,
    /// `{id}.{timestamp}.{body}` (Standard Webhooks).
    IdTimestampBody,
}

impl CanonicalContent {
    /// Build the signed bytes.
    ///
    /// Fails with `MissingCredential` if the layout needs an id or timestamp that was not supplied.
    pub fn build(
        &self,
        id: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let content = match self {
            CanonicalContent::Body => body.to_vec(),
            CanonicalContent::TimestampDotBody => join(&[required_timestamp(timestamp)?], b".", body),
            CanonicalContent::TimestampColonBody => {
                join(&[required_timestamp(timestamp)?], b":", body)
            }
            CanonicalContent::TimestampBody => join(&[required_timestamp(timestamp)?], b"", body),
            CanonicalContent::IdTimestampBody => {
                let id = id.ok_or_else(|| {
                    webhook_error(WebhookErrorKind::MissingCredential, "message id missing")
                })?;
                join(&[id, required_timestamp(timestamp)?], b".", body)
            }
        };
        Ok(content)
    }
}

fn required_timestamp(timestamp: Option<&str>) -> Result<&str, Error> {
    timestamp.ok_or_else(|| webhook_error(WebhookErrorKind::MissingCredential, "timestamp missing"))
}

fn join(prefix_parts: &[&str], separator: &[u8], body: &[u8]) -> Vec<u8> {
    let prefix_len: usize = prefix_parts
        .iter()
        .map(|part| part.len() + separator.len())
        .sum();
    let mut content = Vec::with_capacity(prefix_len + body.len());
    for part in prefix_parts {
        content.extend_from_slice(part.as_bytes());
        content.extend_from_slice(separator);
    }
    content.extend_from_slice(body);
    content
}
