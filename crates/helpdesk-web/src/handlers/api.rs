//! JSON endpoints alongside the dashboard page

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Error body for the JSON endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Error code
    pub code: String,

    /// Success status (always false for errors)
    pub success: bool,

    /// Error timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
            timestamp: Utc::now(),
        }
    }
}

/// Result of a cache clear request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearResponse {
    /// Whether a loaded export was dropped
    pub cleared: bool,
}

/// Every dashboard aggregation as JSON
pub async fn api_summary(State(state): State<Arc<AppState>>) -> Response {
    match state.summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            error!("Failed to build dashboard summary: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string(), "DASHBOARD_UNAVAILABLE")),
            )
                .into_response()
        }
    }
}

/// Drop the cached export so the next request re-reads the file
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Response {
    match state.clear_cache().await {
        Ok(cleared) => {
            info!(cleared, "Cache clear requested");
            Json(CacheClearResponse { cleared }).into_response()
        }
        Err(e) => {
            error!("Failed to clear ticket cache: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string(), "CACHE_CLEAR_FAILED")),
            )
                .into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handle 404 Not Found errors
pub async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not Found",
            "code": "ROUTE_NOT_FOUND",
            "message": "The requested endpoint does not exist"
        })),
    )
}
