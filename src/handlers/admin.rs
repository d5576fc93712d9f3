// src/handlers/admin.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use validator::Validate;

use crate::{
    error::AppError,
    models::roster::RosterEntry,
    store::{DocumentStore, ROSTER},
};

/// Imports (or refreshes) roster entries.
/// Admin only. The whole upload is validated before anything is written.
pub async fn import_roster(
    State(store): State<Arc<dyn DocumentStore>>,
    Json(entries): Json<Vec<RosterEntry>>,
) -> Result<impl IntoResponse, AppError> {
    if entries.is_empty() {
        return Err(AppError::BadRequest("Roster upload is empty".to_string()));
    }

    for (i, entry) in entries.iter().enumerate() {
        if let Err(validation_errors) = entry.validate() {
            return Err(AppError::BadRequest(format!(
                "Row {}: {}",
                i + 1,
                validation_errors
            )));
        }
    }

    for entry in &entries {
        let fields = match serde_json::to_value(entry)? {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::InternalServerError(
                    "Roster entry did not serialize to an object".to_string(),
                ));
            }
        };
        store.merge(ROSTER, &entry.key(), fields).await?;
    }

    tracing::info!("Imported {} roster entries", entries.len());

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"imported": entries.len()})),
    ))
}
