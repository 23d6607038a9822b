use crate::{
    controller::{health_check_controller, webhook_controller},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn webhook_routes(app_state: AppState) -> Router {
    let max_body_bytes = app_state.config.max_body_bytes;
    Router::new()
        .route("/webhooks/{provider}", post(webhook_controller::receive))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(app_state)
}
