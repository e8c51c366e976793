//! Page routes

pub mod calculator;

use axum::{response::Redirect, routing::get, Router};

use crate::error::AppError;
use crate::AppState;

/// Site page routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/pricing") }))
        .route("/pricing", get(calculator::calculator))
        .route("/health", get(|| async { "ok" }))
}

/// Fallback for paths no route matches
pub async fn not_found() -> AppError {
    AppError::NotFound
}
