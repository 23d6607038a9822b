//! Pre-configured verifier settings per provider.

use std::sync::Arc;

use crate::compute::{MacAlgorithm, SignatureEncoding};
use crate::content::CanonicalContent;
use crate::freshness::ReplayWindow;
use crate::jwks::JwksCache;
use crate::webhook::{
    EcdsaVerifier, HmacWebhookVerifier, JwtBodyHashVerifier, SharedTokenVerifier,
    StandardWebhooksVerifier, TimestampLayout, TimestampedHmacVerifier, TokenSource,
};

/// Default replay tolerance, five minutes.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// ElevenLabs signs with a thirty minute tolerance.
pub const ELEVENLABS_TOLERANCE_SECS: i64 = 1800;

/// Stripe: `Stripe-Signature: t=<ts>,v1=<hex>`, signs `{t}.{body}`.
pub fn stripe_verifier() -> TimestampedHmacVerifier {
    TimestampedHmacVerifier::new(
        TimestampLayout::combined("stripe-signature", ',', "t", "v1"),
        CanonicalContent::TimestampDotBody,
        SignatureEncoding::Hex,
        ReplayWindow::past_only(DEFAULT_TOLERANCE_SECS),
    )
}

/// ElevenLabs: `ElevenLabs-Signature: t=<ts>,v0=<hex>`.
pub fn elevenlabs_verifier() -> TimestampedHmacVerifier {
    TimestampedHmacVerifier::new(
        TimestampLayout::combined("elevenlabs-signature", ',', "t", "v0"),
        CanonicalContent::TimestampDotBody,
        SignatureEncoding::Hex,
        ReplayWindow::symmetric(ELEVENLABS_TOLERANCE_SECS),
    )
}

/// Paddle: `Paddle-Signature: ts=<ts>;h1=<hex>`, signs `{ts}:{body}`.
pub fn paddle_verifier() -> TimestampedHmacVerifier {
    TimestampedHmacVerifier::new(
        TimestampLayout::combined("paddle-signature", ';', "ts", "h1"),
        CanonicalContent::TimestampColonBody,
        SignatureEncoding::Hex,
        ReplayWindow::past_only(DEFAULT_TOLERANCE_SECS),
    )
}

/// Webflow: separate signature and millisecond timestamp headers.
pub fn webflow_verifier() -> TimestampedHmacVerifier {
    TimestampedHmacVerifier::new(
        TimestampLayout::split("x-webflow-signature", "x-webflow-timestamp"),
        CanonicalContent::TimestampColonBody,
        SignatureEncoding::Hex,
        ReplayWindow::symmetric(DEFAULT_TOLERANCE_SECS).in_milliseconds(),
    )
}

/// Clerk (Svix): `svix-*` headers, past-only window.
pub fn clerk_verifier() -> StandardWebhooksVerifier {
    StandardWebhooksVerifier::new("svix", ReplayWindow::past_only(DEFAULT_TOLERANCE_SECS))
}

/// Resend (Svix): `svix-*` headers, symmetric window.
pub fn resend_verifier() -> StandardWebhooksVerifier {
    StandardWebhooksVerifier::new("svix", ReplayWindow::symmetric(DEFAULT_TOLERANCE_SECS))
}

pub fn openai_verifier() -> StandardWebhooksVerifier {
    StandardWebhooksVerifier::new("webhook", ReplayWindow::symmetric(DEFAULT_TOLERANCE_SECS))
}

pub fn replicate_verifier() -> StandardWebhooksVerifier {
    StandardWebhooksVerifier::new("webhook", ReplayWindow::past_only(DEFAULT_TOLERANCE_SECS))
}

/// GitHub: `X-Hub-Signature-256: sha256=<hex>`.
pub fn github_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new(
        "x-hub-signature-256",
        MacAlgorithm::HmacSha256,
        SignatureEncoding::Hex,
    )
    .with_prefix("sha256=")
}

/// Cursor: the `sha256=` prefix is mandatory.
pub fn cursor_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new(
        "x-webhook-signature",
        MacAlgorithm::HmacSha256,
        SignatureEncoding::Hex,
    )
    .with_required_prefix("sha256=")
}

pub fn shopify_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new(
        "x-shopify-hmac-sha256",
        MacAlgorithm::HmacSha256,
        SignatureEncoding::Base64,
    )
}

pub fn woocommerce_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new(
        "x-wc-webhook-signature",
        MacAlgorithm::HmacSha256,
        SignatureEncoding::Base64,
    )
}

pub fn hookdeck_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new(
        "x-hookdeck-signature",
        MacAlgorithm::HmacSha256,
        SignatureEncoding::Base64,
    )
}

/// Vercel signs with HMAC-SHA1.
pub fn vercel_verifier() -> HmacWebhookVerifier {
    HmacWebhookVerifier::new("x-vercel-signature", MacAlgorithm::HmacSha1, SignatureEncoding::Hex)
}

pub fn sendgrid_verifier() -> EcdsaVerifier {
    EcdsaVerifier::new(
        "x-twilio-email-event-webhook-signature",
        "x-twilio-email-event-webhook-timestamp",
        ReplayWindow::past_only(DEFAULT_TOLERANCE_SECS),
    )
}

pub fn fusionauth_verifier(key_sets: Option<Arc<JwksCache>>) -> JwtBodyHashVerifier {
    let verifier = JwtBodyHashVerifier::new(
        "x-fusionauth-signature-jwt",
        "request_body_sha256",
        ReplayWindow::symmetric(DEFAULT_TOLERANCE_SECS),
    );
    match key_sets {
        Some(cache) => verifier.with_key_sets(cache),
        None => verifier,
    }
}

/// OpenClaw: dedicated header, then Bearer. `?token=` is refused outright.
pub fn openclaw_verifier() -> SharedTokenVerifier {
    SharedTokenVerifier::new(vec![TokenSource::header("x-openclaw-token"), TokenSource::Bearer])
        .refusing_query_param("token")
}

pub fn gitlab_verifier() -> SharedTokenVerifier {
    SharedTokenVerifier::new(vec![TokenSource::header("x-gitlab-token")])
}

/// Postmark: token in the `token` query parameter of the configured webhook URL.
pub fn postmark_verifier() -> SharedTokenVerifier {
    SharedTokenVerifier::new(vec![TokenSource::query("token")])
}

pub fn deepgram_verifier() -> SharedTokenVerifier {
    SharedTokenVerifier::new(vec![TokenSource::header("dg-token")])
}

/// Chargebee: HTTP Basic, compared against `username:password`.
pub fn chargebee_verifier() -> SharedTokenVerifier {
    SharedTokenVerifier::new(vec![TokenSource::Basic])
}
