//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{health_handler, product_feed_handler, webhook_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    /// When set, webhook calls must present it in `x-webhook-secret`
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>, webhook_secret: Option<String>) -> Self {
        Self {
            deps,
            webhook_secret,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhooks/commerce", post(webhook_handler))
        .route("/feeds/products/:currency_code", get(product_feed_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
