use log::*;
use tokio::net::TcpListener;

pub use service::AppState;

mod controller;
mod error;
pub mod router;

/// Bind the configured interface and port and serve until ctrl-c.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{host}");

    let listener = TcpListener::bind(&host).await?;
    let routes = router::define_routes(app_state);

    axum::serve(listener, routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutdown signal received, draining connections");
}
