// src/api.rs
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::dashboard::{DashboardService, DashboardSummary};
use crate::error::ApiError;

// Application state with config
#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub config: Arc<Config>,
}

/// `{ "status": true, "message": ..., "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: true,
            message: message.to_string(),
            data,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/dashboard/summary", get(get_dashboard_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Auto-approves the caller's eligible entries, then returns approved-only
/// totals for today and the current Monday to Sunday week.
async fn get_dashboard_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<DashboardSummary>>, ApiError> {
    info!("Handling /api/dashboard/summary for user {}", user.user_id);
    let summary = state
        .dashboard
        .summary_for(&user.user_id)
        .await
        .map_err(|e| {
            let detail = state.config.expose_error_details.then_some(&e as &dyn std::fmt::Display);
            ApiError::internal("Failed to fetch dashboard summary", detail)
        })?;

    Ok(Json(ApiResponse::success(
        "Dashboard summary fetched successfully",
        summary,
    )))
}
