//! Application error types for robust error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::TokenError;

/// Application-level errors. Every variant renders as `{success: false, message}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Invalid payload: {0}")]
    Payload(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status code and client-facing message. Server-side failures get a generic message.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            AppError::Payload(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::Validation(msg) | AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Token(TokenError::Expired) => {
                (StatusCode::UNAUTHORIZED, "Token expired".to_string())
            }
            AppError::Token(TokenError::Invalid) => {
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AppError::Token(TokenError::Other(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Token verification failed".to_string(),
            ),
            AppError::Db(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
