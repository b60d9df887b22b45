//! Application error types for robust error handling.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Username already taken.")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Login required")]
    LoginRequired,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message safe to show to the person filling in a form, if this error is one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            AppError::Validation(_) | AppError::DuplicateUsername | AppError::InvalidCredentials => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::LoginRequired => {
                return (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response();
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Redis(e) => {
                tracing::error!(error = %e, "redis unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Db(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self
            .user_message()
            .unwrap_or_else(|| "Something went wrong. Please try again later.".to_string());
        (status, Html(views::error_page(status, &message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
