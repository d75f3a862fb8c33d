//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::Router;
use helpdesk_core::Config;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Build the complete web application with all routes and state
pub fn build_app(config: Config) -> Router {
    build_app_with_state(Arc::new(AppState::new(config)))
}

/// Build the application around existing state
pub fn build_app_with_state(state: Arc<AppState>) -> Router {
    build_routes().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new()),
    )
}
