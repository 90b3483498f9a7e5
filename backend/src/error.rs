//! Error handling for the Stock Variance Dashboard
//!
//! Maps loader and internal failures to consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::LoadError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Source errors
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Rendering errors
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Load(err) => {
                let status = match err {
                    LoadError::SourceRead { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    LoadError::MissingColumns { .. }
                    | LoadError::InvalidNumber { .. }
                    | LoadError::ValueOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                let details = match err {
                    LoadError::MissingColumns { columns } => {
                        Some(serde_json::json!({ "columns": columns }))
                    }
                    LoadError::InvalidNumber { row, column, value } => Some(serde_json::json!({
                        "row": row,
                        "column": column,
                        "value": value,
                    })),
                    LoadError::ValueOverflow { row, column } => Some(serde_json::json!({
                        "row": row,
                        "column": column,
                    })),
                    LoadError::SourceRead { .. } => None,
                };
                (
                    status,
                    ErrorDetail {
                        code: err.code().to_string(),
                        message: err.to_string(),
                        details,
                    },
                )
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    details: None,
                },
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "BAD_REQUEST".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "TEMPLATE_ERROR".to_string(),
                    message: "Failed to render the dashboard page".to_string(),
                    details: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
