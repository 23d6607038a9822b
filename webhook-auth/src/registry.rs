//! Verifier registry: provider name to scheme verifier.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::jwks::JwksCache;
use crate::providers::Provider;
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;
use crate::webhook::{verify_with, SchemeVerifier, VerificationResult};

/// Dispatch table from provider names to verifiers.
///
/// Names are matched case-insensitively. Resolving an unregistered name is a
/// configuration error and never falls through to acceptance.
#[derive(Clone, Default)]
pub struct Registry {
    verifiers: HashMap<String, Arc<dyn SchemeVerifier>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in provider preset.
    pub fn with_builtin_providers(key_sets: Option<Arc<JwksCache>>) -> Self {
        let mut registry = Self::new();
        for provider in Provider::ALL {
            registry.register(provider.as_str(), provider.verifier(key_sets.clone()));
        }
        info!("Registered {} built-in webhook providers", registry.verifiers.len());
        registry
    }

    /// Register `verifier` under `provider`, replacing any earlier registration.
    pub fn register(&mut self, provider: &str, verifier: Arc<dyn SchemeVerifier>) {
        self.verifiers.insert(normalize(provider), verifier);
    }

    /// Look up the verifier registered for `provider`.
    pub fn resolve(&self, provider: &str) -> Result<Arc<dyn SchemeVerifier>, Error> {
        self.verifiers
            .get(&normalize(provider))
            .cloned()
            .ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::ConfigurationError,
                    &format!("no verifier registered for provider {}", provider),
                )
            })
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.verifiers.contains_key(&normalize(provider))
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.verifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Verify `request` as coming from `provider`.
    ///
    /// # Arguments
    ///
    /// * `provider` - Registered provider name
    /// * `request` - Raw body, headers and query of the inbound request
    /// * `secret` - The provider's configured secret, `None` if unset
    pub async fn verify(
        &self,
        provider: &str,
        request: &VerificationRequest,
        secret: Option<&SigningSecret>,
    ) -> VerificationResult {
        match self.resolve(provider) {
            Ok(verifier) => verify_with(verifier.as_ref(), provider, request, secret).await,
            Err(err) => {
                error!("Webhook received for unregistered provider {}", provider);
                VerificationResult::Rejected(err)
            }
        }
    }
}

fn normalize(provider: &str) -> String {
    provider.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{compute_encoded, MacAlgorithm, SignatureEncoding};
    use crate::request::Headers;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use chrono::{TimeZone, Utc};

    const BODY: &[u8] = br#"{"id":"evt_1"}"#;

    fn registry() -> Registry {
        Registry::with_builtin_providers(None)
    }

    fn hex_hmac(key: &str, content: &[u8]) -> String {
        compute_encoded(MacAlgorithm::HmacSha256, SignatureEncoding::Hex, key.as_bytes(), content)
            .unwrap()
    }

    #[test]
    fn test_all_builtin_providers_registered() {
        let registry = registry();
        for provider in Provider::ALL {
            assert!(registry.contains(provider.as_str()));
        }
        assert_eq!(registry.providers().len(), Provider::ALL.len());
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let err = registry().resolve("unknown").err().unwrap();
        assert_eq!(err.reason(), WebhookErrorKind::ConfigurationError);
    }

    #[tokio::test]
    async fn test_unknown_provider_rejects() {
        let request = VerificationRequest::new(BODY.to_vec(), Headers::new());
        let secret = SigningSecret::shared("x");

        let result = registry().verify("unknown", &request, Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::ConfigurationError));
    }

    #[tokio::test]
    async fn test_stripe_end_to_end() {
        let secret = SigningSecret::shared("whsec_testsecret");
        let signature = hex_hmac("whsec_testsecret", br#"1700000000.{"id":"evt_1"}"#);
        let headers = Headers::new().with("Stripe-Signature", format!("t=1700000000,v1={}", signature));
        let request = VerificationRequest::new(BODY.to_vec(), headers);

        let fresh = request
            .clone()
            .with_received_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert!(registry().verify("stripe", &fresh, Some(&secret)).await.is_accepted());

        let stale = request.with_received_at(Utc.timestamp_opt(1_700_000_400, 0).unwrap());
        let result = registry().verify("stripe", &stale, Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::TimestampExpired));
        assert_eq!(result.recommended_status(), 401);
    }

    #[tokio::test]
    async fn test_garbled_stripe_header_is_unauthorized() {
        let headers = Headers::new().with("Stripe-Signature", "t=abc,v1=deadbeef");
        let request = VerificationRequest::new(BODY.to_vec(), headers);

        let result = registry()
            .verify("stripe", &request, Some(&SigningSecret::shared("whsec_testsecret")))
            .await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::MalformedCredential));
        assert_eq!(result.recommended_status(), 401);
    }

    #[tokio::test]
    async fn test_openai_window_is_symmetric() {
        let key = b"openai-signing-key";
        let secret = SigningSecret::shared(format!("whsec_{}", STANDARD.encode(key)));
        let signature = compute_encoded(
            MacAlgorithm::HmacSha256,
            SignatureEncoding::Base64,
            key,
            br#"msg_1.1700000000.{"id":"evt_1"}"#,
        )
        .unwrap();
        let at = |now: i64, body: &[u8]| {
            let headers = Headers::new()
                .with("webhook-id", "msg_1")
                .with("webhook-timestamp", "1700000000")
                .with("webhook-signature", format!("v1,{}", signature));
            VerificationRequest::new(body.to_vec(), headers)
                .with_received_at(Utc.timestamp_opt(now, 0).unwrap())
        };

        let result = registry().verify("openai", &at(1_700_000_000, BODY), Some(&secret)).await;
        assert!(result.is_accepted());

        let result = registry().verify("openai", &at(1_700_000_301, BODY), Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::TimestampExpired));

        let result = registry().verify("openai", &at(1_699_999_699, BODY), Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::TimestampInFuture));

        let result = registry()
            .verify("openai", &at(1_700_000_000, br#"{"id":"evt_2"}"#), Some(&secret))
            .await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_missing_secret_checked_before_headers() {
        let request = VerificationRequest::new(BODY.to_vec(), Headers::new());

        let result = registry().verify("github", &request, None).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::ConfigurationError));
    }

    #[tokio::test]
    async fn test_provider_name_is_case_insensitive() {
        let signature = hex_hmac("gh", BODY);
        let headers = Headers::new().with("X-Hub-Signature-256", format!("sha256={}", signature));
        let request = VerificationRequest::new(BODY.to_vec(), headers);

        let result = registry()
            .verify("GitHub", &request, Some(&SigningSecret::shared("gh")))
            .await;
        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_github_empty_object() {
        let signed = |key: &str| {
            let headers =
                Headers::new().with("x-hub-signature-256", format!("sha256={}", hex_hmac(key, b"{}")));
            VerificationRequest::new(b"{}".to_vec(), headers)
        };
        let secret = SigningSecret::shared("itsasecret");

        let result = registry().verify("github", &signed("itsasecret"), Some(&secret)).await;
        assert!(result.is_accepted());

        let result = registry().verify("github", &signed("another"), Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_openclaw_bearer_and_query() {
        let secret = SigningSecret::shared("abc123");

        let request = VerificationRequest::new(
            BODY.to_vec(),
            Headers::new().with("Authorization", "Bearer abc123"),
        );
        assert!(registry().verify("openclaw", &request, Some(&secret)).await.is_accepted());

        let request = VerificationRequest::new(BODY.to_vec(), Headers::new()).with_query("token=abc123");
        let result = registry().verify("openclaw", &request, Some(&secret)).await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::MissingCredential));
    }

    #[tokio::test]
    async fn test_vercel_uses_sha1() {
        let signature = compute_encoded(MacAlgorithm::HmacSha1, SignatureEncoding::Hex, b"vc", BODY)
            .unwrap();
        let request = VerificationRequest::new(
            BODY.to_vec(),
            Headers::new().with("x-vercel-signature", signature),
        );

        let result = registry()
            .verify("vercel", &request, Some(&SigningSecret::shared("vc")))
            .await;
        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_clerk_standard_webhooks() {
        let key = b"clerk-signing-key";
        let content = br#"msg_1.1700000000.{"id":"evt_1"}"#;
        let signature =
            compute_encoded(MacAlgorithm::HmacSha256, SignatureEncoding::Base64, key, content)
                .unwrap();
        let headers = Headers::new()
            .with("svix-id", "msg_1")
            .with("svix-timestamp", "1700000000")
            .with("svix-signature", format!("v1,{}", signature));
        let request = VerificationRequest::new(BODY.to_vec(), headers)
            .with_received_at(Utc.timestamp_opt(1_700_000_060, 0).unwrap());
        let secret = SigningSecret::shared(format!("whsec_{}", STANDARD.encode(key)));

        assert!(registry().verify("clerk", &request, Some(&secret)).await.is_accepted());
    }

    #[tokio::test]
    async fn test_paddle_semicolon_header() {
        let signature = hex_hmac("pdl", br#"1700000000:{"id":"evt_1"}"#);
        let headers = Headers::new().with("Paddle-Signature", format!("ts=1700000000;h1={}", signature));
        let request = VerificationRequest::new(BODY.to_vec(), headers)
            .with_received_at(Utc.timestamp_opt(1_700_000_001, 0).unwrap());

        let result = registry()
            .verify("paddle", &request, Some(&SigningSecret::shared("pdl")))
            .await;
        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_gitlab_token() {
        let request = VerificationRequest::new(
            BODY.to_vec(),
            Headers::new().with("X-Gitlab-Token", "gl-token"),
        );
        let secret = SigningSecret::shared("gl-token");

        assert!(registry().verify("gitlab", &request, Some(&secret)).await.is_accepted());

        let result = registry()
            .verify("gitlab", &request, Some(&SigningSecret::shared("other")))
            .await;
        assert_eq!(result.reason(), Some(WebhookErrorKind::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_custom_registration_replaces_builtin() {
        let mut registry = registry();
        registry.register(
            "github",
            Arc::new(crate::webhook::SharedTokenVerifier::new(vec![
                crate::webhook::TokenSource::header("x-test-token"),
            ])),
        );
        let request = VerificationRequest::new(
            BODY.to_vec(),
            Headers::new().with("x-test-token", "t"),
        );

        let result = registry
            .verify("github", &request, Some(&SigningSecret::shared("t")))
            .await;
        assert!(result.is_accepted());
    }
}
