// src/handlers/health.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, store::DocumentStore};

pub async fn root() -> &'static str {
    "Quiz reports backend online"
}

/// Reports store connectivity by listing its collections.
pub async fn health(
    State(store): State<Arc<dyn DocumentStore>>,
) -> Result<impl IntoResponse, AppError> {
    let collections = store.list_collections().await?;

    Ok(Json(json!({
        "status": "ok",
        "collections": collections,
    })))
}
