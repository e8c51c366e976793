//! Signage network website: pricing engine and calculator frontend.

pub mod config;
pub mod error;
pub mod pricing;
pub mod routes;

use axum::Router;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use pricing::PolicyRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub policies: PolicyRegistry,
}

impl AppState {
    pub fn new(policies: PolicyRegistry) -> Self {
        Self { policies }
    }
}

/// Build the application router
pub fn app(state: AppState, static_dir: &std::path::Path) -> Router {
    Router::new()
        .merge(routes::router())
        .nest("/api/pricing", pricing::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
