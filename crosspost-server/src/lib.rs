//! HTTP API for Crosspost
//!
//! The router is built here so integration tests can drive it without binding
//! a socket; `main.rs` only handles process setup.

pub mod auth;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use libcrosspost::CrosspostService;
use tower_http::trace::TraceLayer;

/// Room for the non-image form fields on top of the largest accepted image
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared state handed to every handler
pub struct AppState {
    pub service: CrosspostService,
}

impl AppState {
    pub fn new(service: CrosspostService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.service.config().publishing.max_image_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/healthz", get(health))
        .merge(routes::build_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
