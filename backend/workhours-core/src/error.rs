// src/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, error};

/// Everything an API handler can fail with, as seen by clients.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    /// `context` is the client-facing lead ("Failed to fetch dashboard
    /// summary"); `detail`, when given, is appended after a colon.
    pub fn internal(context: &str, detail: Option<&dyn Display>) -> Self {
        let message = match detail {
            Some(detail) => format!("{}: {}", context, detail),
            None => context.to_string(),
        };
        ApiError::Internal { message }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Internal { .. } => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unauthenticated => debug!("Rejecting unauthenticated request"),
            ApiError::Internal { message } => error!("Error occurred: {}", message),
        }
        let body = Json(json!({
            "status": false,
            "message": self.to_string(),
            "error": self.kind(),
        }));
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_message_includes_detail_only_when_given() {
        let detail = "database is locked";
        let with = ApiError::internal("Failed to fetch dashboard summary", Some(&detail));
        let without = ApiError::internal("Failed to fetch dashboard summary", None);

        assert_eq!(
            with.to_string(),
            "Failed to fetch dashboard summary: database is locked"
        );
        assert_eq!(without.to_string(), "Failed to fetch dashboard summary");
        assert_eq!(with.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        let err = ApiError::Unauthenticated;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.kind(), "unauthenticated");
    }
}
