//! Shared-token schemes (OpenClaw, GitLab, Postmark, Deepgram, Chargebee).
//!
//! No signature: the sender presents the configured secret itself, which is compared in
//! constant time.

use async_trait::async_trait;
use tracing::warn;

use super::{Scheme, SchemeVerifier};
use crate::compare::constant_time_eq;
use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::extract::{basic_credentials, bearer_token};
use crate::request::VerificationRequest;
use crate::secret::SigningSecret;

/// Where a token may be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A named header carrying the token verbatim.
    Header(String),
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// A query string parameter.
    Query(String),
    /// `Authorization: Basic <base64(user:password)>`, compared against `user:password`.
    Basic,
}

impl TokenSource {
    pub fn header(name: &str) -> Self {
        TokenSource::Header(name.to_string())
    }

    pub fn query(name: &str) -> Self {
        TokenSource::Query(name.to_string())
    }

    fn extract(&self, request: &VerificationRequest) -> Result<Option<String>, Error> {
        let token = match self {
            TokenSource::Header(name) => request.headers().get_non_empty(name).map(str::to_string),
            TokenSource::Bearer => bearer_token(request.headers()).map(str::to_string),
            TokenSource::Query(name) => request
                .query_param(name)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string),
            TokenSource::Basic => basic_credentials(request.headers())?,
        };
        Ok(token)
    }
}

/// Verifies a token presented through one of several sources, tried in order.
#[derive(Debug, Clone)]
pub struct SharedTokenVerifier {
    sources: Vec<TokenSource>,
    refused_query_params: Vec<String>,
}

impl SharedTokenVerifier {
    pub fn new(sources: Vec<TokenSource>) -> Self {
        Self {
            sources,
            refused_query_params: Vec::new(),
        }
    }

    /// Reject any request carrying `param` in its query string, even if a valid header
    /// token is present.
    pub fn refusing_query_param(mut self, param: &str) -> Self {
        self.refused_query_params.push(param.to_string());
        self
    }
}

#[async_trait]
impl SchemeVerifier for SharedTokenVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
        secret: &SigningSecret,
    ) -> Result<(), Error> {
        let secret = secret.shared_secret()?;

        if let Some(param) = self
            .refused_query_params
            .iter()
            .find(|param| request.has_query_param(param))
        {
            warn!("Refusing token presented in query parameter {}", param);
            return Err(webhook_error(
                WebhookErrorKind::MissingCredential,
                "query-string credentials are refused",
            ));
        }

        let mut presented = None;
        for source in &self.sources {
            if let Some(token) = source.extract(request)? {
                presented = Some(token);
                break;
            }
        }

        let presented = presented.ok_or_else(|| {
            webhook_error(WebhookErrorKind::MissingCredential, "no token presented")
        })?;

        if constant_time_eq(presented.as_bytes(), secret.as_bytes()) {
            Ok(())
        } else {
            Err(webhook_error(
                WebhookErrorKind::SignatureMismatch,
                "token does not match",
            ))
        }
    }

    fn scheme(&self) -> Scheme {
        Scheme::SharedToken
    }
}
