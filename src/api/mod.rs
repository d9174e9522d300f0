//! HTTP API module
//!
//! Exposes the ZooKeeper operations to the cluster controller.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/zookeeper/configure", post(configure_handler))
        .route("/zookeeper/start", post(start_handler))
        .route("/zookeeper/stop", post(stop_handler))
        .route("/zookeeper/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
