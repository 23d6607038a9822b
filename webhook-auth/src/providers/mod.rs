//! Built-in webhook providers.

mod config;

pub use config::*;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::jwks::JwksCache;
use crate::webhook::SchemeVerifier;

/// Providers with a built-in verifier preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Stripe,
    ElevenLabs,
    Paddle,
    Webflow,
    Clerk,
    Resend,
    OpenAi,
    Replicate,
    GitHub,
    Cursor,
    Shopify,
    WooCommerce,
    Hookdeck,
    Vercel,
    SendGrid,
    FusionAuth,
    OpenClaw,
    GitLab,
    Postmark,
    Deepgram,
    Chargebee,
}

impl Provider {
    pub const ALL: [Provider; 21] = [
        Provider::Stripe,
        Provider::ElevenLabs,
        Provider::Paddle,
        Provider::Webflow,
        Provider::Clerk,
        Provider::Resend,
        Provider::OpenAi,
        Provider::Replicate,
        Provider::GitHub,
        Provider::Cursor,
        Provider::Shopify,
        Provider::WooCommerce,
        Provider::Hookdeck,
        Provider::Vercel,
        Provider::SendGrid,
        Provider::FusionAuth,
        Provider::OpenClaw,
        Provider::GitLab,
        Provider::Postmark,
        Provider::Deepgram,
        Provider::Chargebee,
    ];

    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Stripe => "stripe",
            Provider::ElevenLabs => "elevenlabs",
            Provider::Paddle => "paddle",
            Provider::Webflow => "webflow",
            Provider::Clerk => "clerk",
            Provider::Resend => "resend",
            Provider::OpenAi => "openai",
            Provider::Replicate => "replicate",
            Provider::GitHub => "github",
            Provider::Cursor => "cursor",
            Provider::Shopify => "shopify",
            Provider::WooCommerce => "woocommerce",
            Provider::Hookdeck => "hookdeck",
            Provider::Vercel => "vercel",
            Provider::SendGrid => "sendgrid",
            Provider::FusionAuth => "fusionauth",
            Provider::OpenClaw => "openclaw",
            Provider::GitLab => "gitlab",
            Provider::Postmark => "postmark",
            Provider::Deepgram => "deepgram",
            Provider::Chargebee => "chargebee",
        }
    }

    /// Build this provider's verifier preset.
    ///
    /// `key_sets` is only used by FusionAuth, for secrets given as a JWKS URL.
    pub fn verifier(&self, key_sets: Option<Arc<JwksCache>>) -> Arc<dyn SchemeVerifier> {
        match self {
            Provider::Stripe => Arc::new(stripe_verifier()),
            Provider::ElevenLabs => Arc::new(elevenlabs_verifier()),
            Provider::Paddle => Arc::new(paddle_verifier()),
            Provider::Webflow => Arc::new(webflow_verifier()),
            Provider::Clerk => Arc::new(clerk_verifier()),
            Provider::Resend => Arc::new(resend_verifier()),
            Provider::OpenAi => Arc::new(openai_verifier()),
            Provider::Replicate => Arc::new(replicate_verifier()),
            Provider::GitHub => Arc::new(github_verifier()),
            Provider::Cursor => Arc::new(cursor_verifier()),
            Provider::Shopify => Arc::new(shopify_verifier()),
            Provider::WooCommerce => Arc::new(woocommerce_verifier()),
            Provider::Hookdeck => Arc::new(hookdeck_verifier()),
            Provider::Vercel => Arc::new(vercel_verifier()),
            Provider::SendGrid => Arc::new(sendgrid_verifier()),
            Provider::FusionAuth => Arc::new(fusionauth_verifier(key_sets)),
            Provider::OpenClaw => Arc::new(openclaw_verifier()),
            Provider::GitLab => Arc::new(gitlab_verifier()),
            Provider::Postmark => Arc::new(postmark_verifier()),
            Provider::Deepgram => Arc::new(deepgram_verifier()),
            Provider::Chargebee => Arc::new(chargebee_verifier()),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == name)
            .ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::ConfigurationError,
                    &format!("unknown provider: {}", s),
                )
            })
    }
}
