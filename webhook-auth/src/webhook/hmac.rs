//! Body-only HMAC webhook signature validation.

use async_trait::async_trait;

use super::{match_candidates, required_header, Scheme, SchemeVerifier};
use crate::compute::{compute_mac, MacAlgorithm, SignatureEncoding};
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;

/// Whether the signature header must carry its algorithm prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixPolicy {
    Optional,
    Required,
}

/// HMAC webhook verifier over the raw body.
///
/// Used by GitHub, Cursor, Shopify, WooCommerce, Hookdeck and Vercel. The shared secret is
/// used as literal UTF-8 key bytes.
#[derive(Debug, Clone)]
pub struct HmacWebhookVerifier {
    signature_header: String,
    algorithm: MacAlgorithm,
    encoding: SignatureEncoding,
    prefix: Option<(String, PrefixPolicy)>,
}

impl HmacWebhookVerifier {
    /// Create a new body HMAC verifier.
    ///
    /// # Arguments
    ///
    /// * `signature_header` - Name of the header containing the signature
    /// * `algorithm` - MAC primitive the sender signs with
    /// * `encoding` - How the signature is written in the header
    pub fn new(
        signature_header: impl Into<String>,
        algorithm: MacAlgorithm,
        encoding: SignatureEncoding,
    ) -> Self {
        Self {
            signature_header: signature_header.into(),
            algorithm,
            encoding,
            prefix: None,
        }
    }

    /// Strip `prefix` (e.g. `sha256=`) when present.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some((prefix.into(), PrefixPolicy::Optional));
        self
    }

    /// Require `prefix`; a header without it is malformed.
    pub fn with_required_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some((prefix.into(), PrefixPolicy::Required));
        self
    }

    fn strip_prefix<'a>(&self, value: &'a str) -> Result<&'a str, Error> {
        match &self.prefix {
            None => Ok(value),
            Some((prefix, policy)) => match (value.strip_prefix(prefix.as_str()), policy) {
                (Some(stripped), _) => Ok(stripped),
                (None, PrefixPolicy::Optional) => Ok(value),
                (None, PrefixPolicy::Required) => Err(webhook_error(
                    WebhookErrorKind::MalformedCredential,
                    &format!("signature must start with {}", prefix),
                )),
            },
        }
    }
}

#[async_trait]
impl SchemeVerifier for HmacWebhookVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let key = secret.shared_secret()?;
        let signature = required_header(request, &self.signature_header)?;
        let signature = self.strip_prefix(signature)?;

        let expected = compute_mac(self.algorithm, key.as_bytes(), request.body())?;
        match_candidates(&expected, [signature], self.encoding)
    }

    fn scheme(&self) -> Scheme {
        Scheme::BodyHmac
    }
}
