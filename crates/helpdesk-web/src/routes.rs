//! Route definitions for the dashboard

use crate::{
    handlers::{api, pages},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the complete web application router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page routes
        .route("/", get(pages::dashboard))
        // JSON routes
        .route("/api/summary", get(api::api_summary))
        .route("/api/cache/clear", post(api::clear_cache))
        // Health check
        .route("/health", get(api::health_check))
        .fallback(api::not_found_handler)
}
