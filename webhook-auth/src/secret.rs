//! Signing secrets and key material held by the receiving application.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{webhook_error, Error, WebhookErrorKind};

/// Prefix Standard Webhooks senders put in front of the base64 secret.
pub const STANDARD_WEBHOOKS_PREFIX: &str = "whsec_";

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";
const PEM_LINE_WIDTH: usize = 64;

/// Credential associated with one provider endpoint.
///
/// Never transmitted; the verifier only reads it.
#[derive(Debug, Clone)]
pub enum SigningSecret {
    /// Symmetric secret shared with the sender (HMAC keys, tokens, `user:pass`).
    Shared(SecretString),
    /// Public key, PEM encoded with or without armor lines.
    PublicKey(String),
    /// URL of a JSON Web Key Set publishing the sender's verification keys.
    KeySetUrl(String),
}

impl SigningSecret {
    pub fn shared(secret: impl Into<String>) -> Self {
        SigningSecret::Shared(SecretString::new(secret.into()))
    }

    pub fn public_key(key: impl Into<String>) -> Self {
        SigningSecret::PublicKey(key.into())
    }

    pub fn key_set_url(url: impl Into<String>) -> Self {
        SigningSecret::KeySetUrl(url.into())
    }

    /// `true` when the secret carries no usable material.
    pub fn is_empty(&self) -> bool {
        match self {
            SigningSecret::Shared(secret) => secret.expose_secret().trim().is_empty(),
            SigningSecret::PublicKey(key) => key.trim().is_empty(),
            SigningSecret::KeySetUrl(url) => url.trim().is_empty(),
        }
    }

    /// Borrow the shared secret, or fail with `ConfigurationError` for any other variant.
    pub(crate) fn shared_secret(&self) -> Result<&str, Error> {
        match self {
            SigningSecret::Shared(secret) => Ok(secret.expose_secret().as_str()),
            _ => Err(webhook_error(
                WebhookErrorKind::ConfigurationError,
                "scheme requires a shared secret",
            )),
        }
    }

    pub(crate) fn public_key_pem(&self) -> Result<&str, Error> {
        match self {
            SigningSecret::PublicKey(key) => Ok(key.as_str()),
            _ => Err(webhook_error(
                WebhookErrorKind::ConfigurationError,
                "scheme requires a public key",
            )),
        }
    }
}

/// Decode a Standard Webhooks secret into its HMAC key bytes.
///
/// The `whsec_` prefix is stripped before base64 decoding. A secret without the prefix is
/// decoded as-is.
pub fn decode_prefixed_secret(secret: &str) -> Result<Vec<u8>, Error> {
    let encoded = secret
        .strip_prefix(STANDARD_WEBHOOKS_PREFIX)
        .unwrap_or(secret);

    STANDARD.decode(encoded.trim()).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: crate::error::ErrorKind::Webhook(WebhookErrorKind::MalformedCredential),
    })
}

/// Return `key` as a PEM document, synthesizing `PUBLIC KEY` armor when it is missing.
pub fn ensure_pem_armor(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("-----BEGIN") {
        return key.to_string();
    }

    let body: String = key.chars().filter(|c| !c.is_whitespace()).collect();
    let lines: Vec<&str> = body
        .as_bytes()
        .chunks(PEM_LINE_WIDTH)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    format!("{}\n{}\n{}", PEM_HEADER, lines.join("\n"), PEM_FOOTER)
}
