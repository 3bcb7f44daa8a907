//! Sharegate — scoped public share links for project collaboration tools.
//!
//! Library crate: module tree plus the router assembly, so integration
//! tests in `tests/` can drive the real application over the in-memory
//! store backend.

use std::sync::Arc;

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod share;
pub mod store;
pub mod tools;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub store: Arc<dyn store::Store>,
    pub config: config::Config,
}

/// Builds the full application router: health endpoints, the
/// session-authenticated management API under `/api`, and the
/// unauthenticated public resolution routes.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .route("/readyz", axum::routing::get(|| async { "ok" }))
        .nest("/api", api::management_router(state.clone()))
        .merge(api::public_router())
        .with_state(state)
}
