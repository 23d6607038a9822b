//! Webhook signature verification.
//!
//! One [`SchemeVerifier`] implementation per signing scheme. Every verifier walks the same
//! path: extract proof material, check the replay window, rebuild the signed content,
//! compute the expected signature, and compare. Any step may end the call with a
//! rejection; none of them retries.

mod ecdsa;
mod hmac;
mod jwt;
mod standard;
mod timestamped;
mod token;

pub use self::ecdsa::EcdsaVerifier;
pub use self::hmac::HmacWebhookVerifier;
pub use self::jwt::JwtBodyHashVerifier;
pub use self::standard::StandardWebhooksVerifier;
pub use self::timestamped::{TimestampLayout, TimestampedHmacVerifier};
pub use self::token::{SharedTokenVerifier, TokenSource};

use async_trait::async_trait;
use tracing::{debug, error};

use crate::compare::any_constant_time_eq;
use crate::compute::SignatureEncoding;
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;
use crate::status::recommended_status;

/// Signing scheme families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    BodyHmac,
    TimestampedHmac,
    StandardWebhooks,
    Ecdsa,
    JwtBodyHash,
    SharedToken,
}

/// Trait for verifying webhook requests.
#[async_trait]
pub trait SchemeVerifier: Send + Sync {
    /// Verify a webhook request against the receiver's secret.
    ///
    /// # Arguments
    ///
    /// * `request` - Raw body, headers and query of the inbound request
    /// * `secret` - Secret or key material configured for the provider
    ///
    /// # Returns
    ///
    /// `Ok(())` if the request is authentic, otherwise an error whose
    /// [`reason`](Error::reason) says why it was rejected.
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error>;

    /// The scheme family this verifier implements.
    fn scheme(&self) -> Scheme;
}

/// Outcome of one verification call.
#[derive(Debug)]
pub enum VerificationResult {
    Accepted,
    Rejected(Error),
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationResult::Accepted)
    }

    /// Rejection reason, `None` when accepted.
    pub fn reason(&self) -> Option<WebhookErrorKind> {
        match self {
            VerificationResult::Accepted => None,
            VerificationResult::Rejected(err) => Some(err.reason()),
        }
    }

    /// Advisory HTTP status for answering the sender.
    pub fn recommended_status(&self) -> u16 {
        self.reason().map(recommended_status).unwrap_or(200)
    }
}

impl From<Result<(), Error>> for VerificationResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => VerificationResult::Accepted,
            Err(err) => VerificationResult::Rejected(err),
        }
    }
}

/// Run `verifier`, failing closed when no usable secret is configured.
///
/// The secret is checked before anything in the request is looked at.
pub async fn verify_with(
    verifier: &dyn SchemeVerifier,
    provider: &str,
    request: &VerificationRequest,
    secret: Option<&SigningSecret>,
) -> VerificationResult {
    let result = match secret {
        Some(secret) if !secret.is_empty() => verifier.verify(request, secret).await,
        _ => Err(webhook_error(
            WebhookErrorKind::ConfigurationError,
            "no signing secret configured",
        )),
    };

    if let Err(err) = &result {
        log_rejection(provider, verifier.scheme(), err);
    }

    result.into()
}

pub(crate) fn log_rejection(provider: &str, scheme: Scheme, err: &Error) {
    match err.reason() {
        WebhookErrorKind::ConfigurationError => {
            error!(
                "Webhook verification for {} ({:?}) is misconfigured: {:?}",
                provider, scheme, err.source
            );
        }
        reason => {
            debug!(
                "Rejected {} webhook ({:?}): {:?}",
                provider, scheme, reason
            );
        }
    }
}

/// First non-blank value of a required header, or `MissingCredential`.
pub(crate) fn required_header<'a>(
    request: &'a VerificationRequest,
    name: &str,
) -> Result<&'a str, Error> {
    request.headers().get_non_empty(name).ok_or_else(|| {
        webhook_error(
            WebhookErrorKind::MissingCredential,
            &format!("Missing header: {}", name),
        )
    })
}

/// Compare `expected` against every decodable candidate.
///
/// Candidates that fail to decode are skipped. If none decode the proof is malformed,
/// otherwise no match is a mismatch.
pub(crate) fn match_candidates<'a>(
    expected: &[u8],
    candidates: impl IntoIterator<Item = &'a str>,
    encoding: SignatureEncoding,
) -> Result<(), Error> {
    let decoded: Vec<Vec<u8>> = candidates
        .into_iter()
        .filter_map(|candidate| encoding.decode(candidate))
        .collect();

    if decoded.is_empty() {
        return Err(webhook_error(
            WebhookErrorKind::MalformedCredential,
            "no signature could be decoded",
        ));
    }

    if any_constant_time_eq(expected, decoded.iter().map(Vec::as_slice)) {
        Ok(())
    } else {
        Err(webhook_error(
            WebhookErrorKind::SignatureMismatch,
            "signature does not match",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Headers;

    #[test]
    fn test_match_candidates_skips_undecodable() {
        let expected = [0xab, 0xcd];
        assert!(match_candidates(&expected, ["zz", "abcd"], SignatureEncoding::Hex).is_ok());

        let err = match_candidates(&expected, ["zz", "q"], SignatureEncoding::Hex).unwrap_err();
        assert_eq!(err.reason(), WebhookErrorKind::MalformedCredential);

        let err = match_candidates(&expected, ["abce"], SignatureEncoding::Hex).unwrap_err();
        assert_eq!(err.reason(), WebhookErrorKind::SignatureMismatch);
    }

    struct AcceptAll;

    #[async_trait]
    impl SchemeVerifier for AcceptAll {
        async fn verify(&self, _: &VerificationRequest, _: &SigningSecret) -> Result<(), Error> {
            Ok(())
        }

        fn scheme(&self) -> Scheme {
            Scheme::SharedToken
        }
    }

    fn request() -> VerificationRequest {
        VerificationRequest::new(b"{}".to_vec(), Headers::new())
    }

    #[tokio::test]
    async fn test_missing_secret_is_configuration_error() {
        let result = verify_with(&AcceptAll, "test", &request(), None).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::ConfigurationError));
        assert_eq!(result.recommended_status(), 500);
    }

    #[tokio::test]
    async fn test_empty_secret_is_configuration_error() {
        let secret = SigningSecret::shared("");
        let result = verify_with(&AcceptAll, "test", &request(), Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::ConfigurationError));
    }

    #[tokio::test]
    async fn test_accepted_maps_to_ok() {
        let secret = SigningSecret::shared("abc");
        let result = verify_with(&AcceptAll, "test", &request(), Some(&secret)).await;
        assert!(result.is_accepted());
        assert_eq!(result.recommended_status(), 200);
    }
}
