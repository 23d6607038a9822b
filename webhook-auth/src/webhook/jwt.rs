//! Signed JWT carrying a hash of the body (FusionAuth).
//!
//! The JWT's own signature is checked first, against a shared HMAC secret, a PEM public
//! key, or a key resolved from a JWKS by `kid`. Only then is the body hash claim compared
//! with `base64(sha256(body))`.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use serde_json::{Map, Value};

use super::{required_header, Scheme, SchemeVerifier};
use crate::compare::constant_time_eq;
use crate::compute::body_sha256_base64;
use crate::error::{webhook_error, Error, ErrorKind, JwksErrorKind, WebhookErrorKind};
use crate::freshness::{check_freshness, ReplayWindow};
use crate::jwks::JwksCache;
use crate::request::VerificationRequest;
use crate::secret::{ensure_pem_armor, SigningSecret};

type Claims = Map<String, Value>;

pub struct JwtBodyHashVerifier {
    header: String,
    claim: String,
    issued_at_window: ReplayWindow,
    key_sets: Option<Arc<JwksCache>>,
}

impl JwtBodyHashVerifier {
    /// # Arguments
    ///
    /// * `header` - Header carrying the compact JWT
    /// * `claim` - Claim holding `base64(sha256(body))`
    /// * `issued_at_window` - Window applied to `iat` when the token has one
    pub fn new(header: &str, claim: &str, issued_at_window: ReplayWindow) -> Self {
        Self {
            header: header.to_string(),
            claim: claim.to_string(),
            issued_at_window,
            key_sets: None,
        }
    }

    /// Resolve keys for [`SigningSecret::KeySetUrl`] secrets through `cache`.
    pub fn with_key_sets(mut self, cache: Arc<JwksCache>) -> Self {
        self.key_sets = Some(cache);
        self
    }

    async fn decoding_key(&self, header: &Header, secret: &SigningSecret) -> Result<DecodingKey, Error> {
        match secret {
            SigningSecret::Shared(_) => {
                if !is_hmac(header.alg) {
                    return Err(disallowed_algorithm(header.alg));
                }
                Ok(DecodingKey::from_secret(secret.shared_secret()?.as_bytes()))
            }
            SigningSecret::PublicKey(pem) => {
                let pem = ensure_pem_armor(pem);
                let key = match header.alg {
                    Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem.as_bytes()),
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes()),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
                    alg => return Err(disallowed_algorithm(alg)),
                };
                key.map_err(|e| Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Webhook(WebhookErrorKind::MalformedCredential),
                })
            }
            SigningSecret::KeySetUrl(url) => {
                if is_hmac(header.alg) {
                    return Err(disallowed_algorithm(header.alg));
                }
                let cache = self.key_sets.as_ref().ok_or_else(|| {
                    webhook_error(
                        WebhookErrorKind::ConfigurationError,
                        "key set URL configured without a key set cache",
                    )
                })?;
                let kid = header.kid.as_deref().ok_or_else(|| {
                    webhook_error(WebhookErrorKind::MalformedCredential, "token has no kid")
                })?;
                let jwk = cache.resolve(url, kid).await?;
                DecodingKey::from_jwk(&jwk).map_err(|e| Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Jwks(JwksErrorKind::UnsupportedKey),
                })
            }
        }
    }

    fn check_time_claims(&self, claims: &Claims, request: &VerificationRequest) -> Result<(), Error> {
        let now = request.received_at().timestamp();

        if let Some(exp) = numeric_claim(claims, "exp")? {
            if now > exp {
                return Err(webhook_error(
                    WebhookErrorKind::TimestampExpired,
                    "token has expired",
                ));
            }
        }

        if let Some(iat) = numeric_claim(claims, "iat")? {
            check_freshness(
                iat,
                now,
                self.issued_at_window.tolerance_secs,
                self.issued_at_window.direction,
            )?;
        }

        Ok(())
    }
}

#[async_trait]
impl SchemeVerifier for JwtBodyHashVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let token = required_header(request, &self.header)?;
        let header = decode_header(token).map_err(malformed_token)?;

        let key = self.decoding_key(&header, secret).await?;

        let mut validation = Validation::new(header.alg);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|e| {
                if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::InvalidSignature) {
                    Error {
                        source: Some(Box::new(e)),
                        error_kind: ErrorKind::Webhook(WebhookErrorKind::SignatureMismatch),
                    }
                } else {
                    malformed_token(e)
                }
            })?
            .claims;

        self.check_time_claims(&claims, request)?;

        let claimed = claims
            .get(&self.claim)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::MalformedCredential,
                    &format!("token has no {} claim", self.claim),
                )
            })?;

        let expected = body_sha256_base64(request.body());
        if constant_time_eq(expected.as_bytes(), claimed.as_bytes()) {
            Ok(())
        } else {
            Err(webhook_error(
                WebhookErrorKind::SignatureMismatch,
                "body hash does not match",
            ))
        }
    }

    fn scheme(&self) -> Scheme {
        Scheme::JwtBodyHash
    }
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn numeric_claim(claims: &Claims, name: &str) -> Result<Option<i64>, Error> {
    claims
        .get(name)
        .map(|value| {
            value.as_i64().ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::MalformedCredential,
                    &format!("{} claim is not an integer", name),
                )
            })
        })
        .transpose()
}

fn disallowed_algorithm(alg: Algorithm) -> Error {
    webhook_error(
        WebhookErrorKind::MalformedCredential,
        &format!("algorithm {:?} is not allowed for the configured key", alg),
    )
}

fn malformed_token(err: jsonwebtoken::errors::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Webhook(WebhookErrorKind::MalformedCredential),
    }
}
