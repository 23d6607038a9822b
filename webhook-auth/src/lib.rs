//! # webhook-auth
//!
//! Verification of inbound webhook requests for third-party providers:
//! - Body HMAC schemes (GitHub, Shopify, Vercel, ...)
//! - Timestamped HMAC schemes with replay windows (Stripe, Paddle, Webflow, ...)
//! - Standard Webhooks / Svix signatures (Clerk, Resend, OpenAI, Replicate)
//! - ECDSA P-256 signatures (SendGrid)
//! - JWT-wrapped body hashes with JWKS key resolution (FusionAuth)
//! - Shared tokens (GitLab, Postmark, Deepgram, Chargebee, OpenClaw)
//!
//! ## Architecture
//!
//! The core never reads configuration or the network on its own: callers hand each
//! call the raw body, the headers, the query and the provider's secret. The only I/O
//! is the optional JWKS fetch, cached process-wide in [`jwks::JwksCache`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhook_auth::{Headers, Registry, SigningSecret, VerificationRequest};
//!
//! let registry = Registry::with_builtin_providers(None);
//! let request = VerificationRequest::new(raw_body, headers);
//! let result = registry
//!     .verify("stripe", &request, Some(&SigningSecret::shared(secret)))
//!     .await;
//! ```

pub mod compare;
pub mod compute;
pub mod content;
pub mod error;
pub mod extract;
pub mod freshness;
pub mod http;
pub mod jwks;
pub mod providers;
pub mod registry;
pub mod request;
pub mod secret;
pub mod status;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind, WebhookErrorKind};
pub use providers::Provider;
pub use registry::Registry;
pub use request::{Headers, VerificationRequest};
pub use secret::SigningSecret;
pub use status::recommended_status;
pub use webhook::{SchemeVerifier, VerificationResult};
