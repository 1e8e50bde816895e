//! Router and shared application state.
//!
//! Every handler receives an [`AppState`] clone. The frequency tracker inside
//! it is created once per router, so each test (or each server) owns its own
//! statistics.

pub mod handler;
pub mod types;

#[cfg(test)]
mod tests;

use crate::server::config::ServerConfig;
use axum::{Router, routing::get};
use fizzbuzz::FrequencyTracker;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Validated server configuration.
    pub config: Arc<ServerConfig>,
    /// Request statistics, one table per state.
    pub tracker: Arc<FrequencyTracker>,
}

impl AppState {
    /// Wraps `config` and creates an empty tracker.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            tracker: Arc::new(FrequencyTracker::new()),
        }
    }
}

/// Builds the service's routes with CORS and request tracing layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/fizzbuzz", get(handler::fizzbuzz))
        .route("/stats", get(handler::stats))
        .route("/docs", get(handler::docs))
        .route("/health", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
