// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failure of a request, mapped onto one HTTP status each.
///
/// Report builders return `NotFound` when the data a report needs is absent;
/// batch generation treats that case as "skip this student" and anything
/// else as fatal.
#[derive(Debug)]
pub enum AppError {
    /// 500. The detail is logged, never sent to the client.
    InternalServerError(String),
    /// 400: missing query parameter or invalid payload.
    BadRequest(String),
    /// 401: missing, malformed or expired bearer credential.
    AuthError(String),
    /// 403: valid credential outside the admin allowlist or school domain.
    Forbidden(String),
    /// 404: no response document, no responses for a quiz, empty export.
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for AppError {}

/// Renders `{"error": "<message>"}` with the variant's status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::InternalServerError(detail) => {
                tracing::error!("Internal Server Error: {}", detail);
                "Internal Server Error".to_string()
            }
            other => other.message().to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Store failures are internal; callers never see SQL detail.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
