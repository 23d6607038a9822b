use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use webhook_auth::http::HttpClientConfig;
use webhook_auth::jwks::RefreshPolicy;
use webhook_auth::{Provider, SigningSecret};

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Largest webhook body accepted, in bytes
    #[arg(long, env, default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Seconds a cached JWKS is used before it is refetched
    #[arg(long, env, default_value_t = 3600)]
    pub jwks_max_age_secs: u64,

    /// Minimum seconds between JWKS refetches triggered by an unknown key id
    #[arg(long, env, default_value_t = 30)]
    pub jwks_min_refresh_interval_secs: u64,

    /// Timeout in seconds for one JWKS request
    #[arg(long, env, default_value_t = 5)]
    pub jwks_fetch_timeout_secs: u64,

    /// Retries for a JWKS request failing with a transient error
    #[arg(long, env, default_value_t = 2)]
    pub jwks_max_retries: u32,

    #[arg(long, env, value_parser = parse_secret)]
    stripe_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    elevenlabs_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    paddle_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    webflow_webhook_secret: Option<SecretString>,
    /// Svix signing secret, `whsec_` followed by base64.
    #[arg(long, env, value_parser = parse_secret)]
    clerk_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    resend_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    openai_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    replicate_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    github_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    cursor_webhook_secret: Option<SecretString>,
    /// Shopify app client secret.
    #[arg(long, env, value_parser = parse_secret)]
    shopify_api_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    woocommerce_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    hookdeck_webhook_secret: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    vercel_webhook_secret: Option<SecretString>,
    /// SendGrid Event Webhook public key (PEM, armor optional).
    #[arg(long, env)]
    sendgrid_webhook_verification_key: Option<String>,
    /// FusionAuth HMAC signing key. Takes precedence over the JWKS URL.
    #[arg(long, env, value_parser = parse_secret)]
    fusionauth_webhook_secret: Option<SecretString>,
    /// FusionAuth JWKS endpoint used to resolve asymmetric signing keys.
    #[arg(long, env)]
    fusionauth_jwks_url: Option<String>,
    #[arg(long, env, value_parser = parse_secret)]
    openclaw_hook_token: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    gitlab_webhook_token: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    postmark_webhook_token: Option<SecretString>,
    /// Deepgram API key identifier echoed back in the `dg-token` header.
    #[arg(long, env, value_parser = parse_secret)]
    deepgram_api_key_id: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    chargebee_webhook_username: Option<SecretString>,
    #[arg(long, env, value_parser = parse_secret)]
    chargebee_webhook_password: Option<SecretString>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    /// The configured secret for `provider`, or `None` when it is not set.
    pub fn signing_secret(&self, provider: Provider) -> Option<SigningSecret> {
        match provider {
            Provider::SendGrid => {
                non_empty(&self.sendgrid_webhook_verification_key).map(SigningSecret::public_key)
            }
            Provider::FusionAuth => exposed(self.fusionauth_webhook_secret.as_ref())
                .map(SigningSecret::shared)
                .or_else(|| non_empty(&self.fusionauth_jwks_url).map(SigningSecret::key_set_url)),
            Provider::Chargebee => {
                let username = exposed(self.chargebee_webhook_username.as_ref())?;
                let password = exposed(self.chargebee_webhook_password.as_ref())?;
                Some(SigningSecret::shared(format!("{}:{}", username, password)))
            }
            provider => exposed(self.shared_secret(provider)).map(SigningSecret::shared),
        }
    }

    /// Whether any provider needs JWKS resolution.
    pub fn uses_key_sets(&self) -> bool {
        matches!(
            self.signing_secret(Provider::FusionAuth),
            Some(SigningSecret::KeySetUrl(_))
        )
    }

    pub fn jwks_refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            max_age: Duration::from_secs(self.jwks_max_age_secs),
            min_refresh_interval: Duration::from_secs(self.jwks_min_refresh_interval_secs),
        }
    }

    pub fn jwks_http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.jwks_fetch_timeout_secs),
            max_retries: self.jwks_max_retries,
            ..HttpClientConfig::default()
        }
    }

    fn shared_secret(&self, provider: Provider) -> Option<&SecretString> {
        match provider {
            Provider::Stripe => self.stripe_webhook_secret.as_ref(),
            Provider::ElevenLabs => self.elevenlabs_webhook_secret.as_ref(),
            Provider::Paddle => self.paddle_webhook_secret.as_ref(),
            Provider::Webflow => self.webflow_webhook_secret.as_ref(),
            Provider::Clerk => self.clerk_webhook_secret.as_ref(),
            Provider::Resend => self.resend_webhook_secret.as_ref(),
            Provider::OpenAi => self.openai_webhook_secret.as_ref(),
            Provider::Replicate => self.replicate_webhook_secret.as_ref(),
            Provider::GitHub => self.github_webhook_secret.as_ref(),
            Provider::Cursor => self.cursor_webhook_secret.as_ref(),
            Provider::Shopify => self.shopify_api_secret.as_ref(),
            Provider::WooCommerce => self.woocommerce_webhook_secret.as_ref(),
            Provider::Hookdeck => self.hookdeck_webhook_secret.as_ref(),
            Provider::Vercel => self.vercel_webhook_secret.as_ref(),
            Provider::OpenClaw => self.openclaw_hook_token.as_ref(),
            Provider::GitLab => self.gitlab_webhook_token.as_ref(),
            Provider::Postmark => self.postmark_webhook_token.as_ref(),
            Provider::Deepgram => self.deepgram_api_key_id.as_ref(),
            Provider::SendGrid | Provider::FusionAuth | Provider::Chargebee => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn exposed(value: Option<&SecretString>) -> Option<String> {
    value
        .map(|secret| secret.expose_secret().trim())
        .filter(|secret| !secret.is_empty())
        .map(str::to_string)
}

fn parse_secret(value: &str) -> Result<SecretString, std::convert::Infallible> {
    Ok(SecretString::new(value.to_string()))
}
