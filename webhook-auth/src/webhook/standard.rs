//! Standard Webhooks signatures (Clerk, Resend, OpenAI, Replicate).
//!
//! Senders set `{prefix}-id`, `{prefix}-timestamp` and `{prefix}-signature`, where the
//! prefix is `svix` or `webhook`. The signature header lists `v1,<base64>` entries and the
//! signed content is `{id}.{timestamp}.{body}`. Secrets are `whsec_` + base64 key bytes.

use async_trait::async_trait;

use super::{match_candidates, required_header, Scheme, SchemeVerifier};
use crate::compute::{compute_mac, MacAlgorithm, SignatureEncoding};
use crate::content::CanonicalContent;
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::extract::parse_versioned_list;
use crate::freshness::ReplayWindow;
use crate::request::VerificationRequest;
use crate::secret::{decode_prefixed_secret, SigningSecret};

const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Clone)]
pub struct StandardWebhooksVerifier {
    id_header: String,
    timestamp_header: String,
    signature_header: String,
    window: ReplayWindow,
}

impl StandardWebhooksVerifier {
    /// `header_prefix` is `svix` or `webhook`.
    pub fn new(header_prefix: &str, window: ReplayWindow) -> Self {
        Self {
            id_header: format!("{}-id", header_prefix),
            timestamp_header: format!("{}-timestamp", header_prefix),
            signature_header: format!("{}-signature", header_prefix),
            window,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.window = self.window.with_tolerance(tolerance_secs);
        self
    }
}

#[async_trait]
impl SchemeVerifier for StandardWebhooksVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let secret = secret.shared_secret()?;

        let id = required_header(request, &self.id_header)?;
        let timestamp = required_header(request, &self.timestamp_header)?;
        let signatures = required_header(request, &self.signature_header)?;
        let signatures = parse_versioned_list(signatures, SIGNATURE_VERSION).ok_or_else(|| {
            webhook_error(
                WebhookErrorKind::MissingCredential,
                "no v1 signature present",
            )
        })?;

        self.window.check(timestamp, request.received_at())?;

        let key = decode_prefixed_secret(secret)?;
        let content = CanonicalContent::IdTimestampBody.build(
            Some(id),
            Some(timestamp),
            request.body(),
        )?;
        let expected = compute_mac(MacAlgorithm::HmacSha256, &key, &content)?;

        match_candidates(
            &expected,
            signatures.candidates(SIGNATURE_VERSION),
            SignatureEncoding::Base64,
        )
    }

    fn scheme(&self) -> Scheme {
        Scheme::StandardWebhooks
    }
}
