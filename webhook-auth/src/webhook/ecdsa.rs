//! ECDSA P-256 signatures over `{timestamp}{body}` (SendGrid).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{required_header, Scheme, SchemeVerifier};
use crate::compute::EcdsaPublicKey;
use crate::content::CanonicalContent;
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::extract::parse_comma_list;
use crate::freshness::ReplayWindow;
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;

const CANDIDATE_TAG: &str = "ecdsa";

/// Verifies base64 DER ECDSA signatures with the sender's public key.
///
/// The signature header may list several comma-separated signatures; any one that
/// verifies is enough.
#[derive(Debug, Clone)]
pub struct EcdsaVerifier {
    signature_header: String,
    timestamp_header: String,
    window: ReplayWindow,
}

impl EcdsaVerifier {
    pub fn new(signature_header: &str, timestamp_header: &str, window: ReplayWindow) -> Self {
        Self {
            signature_header: signature_header.to_string(),
            timestamp_header: timestamp_header.to_string(),
            window,
        }
    }
}

#[async_trait]
impl SchemeVerifier for EcdsaVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let pem = secret.public_key_pem()?;

        let signatures = required_header(request, &self.signature_header)?;
        let timestamp = required_header(request, &self.timestamp_header)?;
        let signatures = parse_comma_list(signatures, CANDIDATE_TAG).ok_or_else(|| {
            webhook_error(WebhookErrorKind::MissingCredential, "no signature present")
        })?;

        self.window.check(timestamp, request.received_at())?;

        let key = EcdsaPublicKey::from_pem(pem)?;
        let content = CanonicalContent::TimestampBody.build(None, Some(timestamp), request.body())?;

        let decoded: Vec<Vec<u8>> = signatures
            .candidates(CANDIDATE_TAG)
            .filter_map(|candidate| STANDARD.decode(candidate).ok())
            .collect();
        if decoded.is_empty() {
            return Err(webhook_error(
                WebhookErrorKind::MalformedCredential,
                "no signature could be decoded",
            ));
        }

        if decoded.iter().any(|der| key.verify_der(&content, der)) {
            Ok(())
        } else {
            Err(webhook_error(
                WebhookErrorKind::SignatureMismatch,
                "no signature verified",
            ))
        }
    }

    fn scheme(&self) -> Scheme {
        Scheme::Ecdsa
    }
}
