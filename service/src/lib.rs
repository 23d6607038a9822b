use config::Config;
use log::info;
use std::sync::Arc;
use webhook_auth::jwks::JwksCache;
use webhook_auth::{Provider, Registry, SigningSecret};

pub mod config;
pub mod logging;

/// Build the verifier registry, with a JWKS cache when a provider resolves keys by URL.
pub fn init_registry(config: &Config) -> Result<Registry, webhook_auth::Error> {
    let key_sets = if config.uses_key_sets() {
        info!(
            "JWKS cache config: max_age={}s, min_refresh_interval={}s, \
             fetch_timeout={}s, max_retries={}",
            config.jwks_max_age_secs,
            config.jwks_min_refresh_interval_secs,
            config.jwks_fetch_timeout_secs,
            config.jwks_max_retries,
        );
        let cache = JwksCache::with_http(config.jwks_http_config(), config.jwks_refresh_policy())?;
        Some(Arc::new(cache))
    } else {
        None
    };

    let registry = Registry::with_builtin_providers(key_sets);

    let configured: Vec<&str> = Provider::ALL
        .iter()
        .filter(|provider| config.signing_secret(**provider).is_some())
        .map(|provider| provider.as_str())
        .collect();
    info!("Webhook providers with secrets configured: {:?}", configured);

    Ok(registry)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, registry: &Arc<Registry>) -> Self {
        Self {
            registry: Arc::clone(registry),
            config: app_config,
        }
    }

    pub fn registry_ref(&self) -> &Registry {
        self.registry.as_ref()
    }

    /// Secret for a provider name, `None` if the name is unknown or the secret unset.
    pub fn signing_secret(&self, provider: &str) -> Option<SigningSecret> {
        provider
            .parse::<Provider>()
            .ok()
            .and_then(|provider| self.config.signing_secret(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    fn config(args: &[&str]) -> Config {
        for arg in Config::command().get_arguments() {
            if let Some(name) = arg.get_env() {
                std::env::remove_var(name);
            }
        }
        Config::try_parse_from(std::iter::once("webhook_gateway").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_registry_without_key_sets() {
        let config = config(&[]);
        let registry = init_registry(&config).unwrap();
        assert!(registry.contains("fusionauth"));
    }

    #[test]
    fn test_app_state_secret_lookup() {
        let config = config(&["--github-webhook-secret", "gh"]);
        let registry = Arc::new(init_registry(&config).unwrap());
        let state = AppState::new(config, &registry);

        assert!(state.signing_secret("github").is_some());
        assert!(state.signing_secret("GitHub").is_some());
        assert!(state.signing_secret("myspace").is_none());
    }
}
