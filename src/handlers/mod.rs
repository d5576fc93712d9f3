// src/handlers/mod.rs

pub mod admin;
pub mod health;
pub mod reports;
pub mod responses;

use crate::error::AppError;

/// Returns the trimmed value of a required query parameter.
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required parameter: {}", name)))
}

/// Treats a blank optional parameter as absent.
pub(crate) fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
