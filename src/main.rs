use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    Logger::init_logger(&config)?;

    info!("Starting up webhook gateway [{:?}]", config.runtime_env());

    let registry = match service::init_registry(&config) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to build the webhook verifier registry: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &registry);

    web::init_server(app_state).await?;

    Ok(())
}
