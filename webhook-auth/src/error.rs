//! Error types for the `webhook-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for webhook-auth crate.
/// Holds error kind and optional source for error chaining.
///
/// The `source` carries internal detail (decoder messages, key parse failures) and is meant
/// for server-side logs only. Callers answering the webhook sender should rely on
/// [`Error::reason`] and never forward the source text.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in webhook-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Webhook(WebhookErrorKind),
    Jwks(JwksErrorKind),
    Http(HttpErrorKind),
}

/// Reasons a webhook request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookErrorKind {
    /// No proof material was found where the scheme expects it.
    MissingCredential,
    /// Proof material (or key material) was present but could not be parsed.
    MalformedCredential,
    /// No candidate signature matched the expected one.
    SignatureMismatch,
    /// The signed timestamp is older than the replay window allows.
    TimestampExpired,
    /// The signed timestamp is further in the future than the replay window allows.
    TimestampInFuture,
    /// The receiving side has no usable secret or no verifier for the provider.
    ConfigurationError,
    /// The raw body was unavailable, e.g. already consumed by a body parser.
    BodyReadError,
}

/// Errors from resolving keys out of a JSON Web Key Set.
#[derive(Debug, PartialEq)]
pub enum JwksErrorKind {
    FetchFailed,
    InvalidKeySet,
    UnknownKeyId,
    UnsupportedKey,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// The rejection reason this error amounts to.
    ///
    /// Key fetching failures fail closed as `MalformedCredential`.
    pub fn reason(&self) -> WebhookErrorKind {
        match &self.error_kind {
            ErrorKind::Webhook(kind) => *kind,
            ErrorKind::Jwks(_) | ErrorKind::Http(_) => WebhookErrorKind::MalformedCredential,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Webhook(kind) => write!(f, "Webhook error: {:?}", kind),
            ErrorKind::Jwks(kind) => write!(f, "JWKS error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        }
    }
}

/// Helper function to create webhook errors.
pub fn webhook_error(kind: WebhookErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Webhook(kind),
    }
}

/// Helper function to create JWKS errors.
pub fn jwks_error(kind: JwksErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Jwks(kind),
    }
}
