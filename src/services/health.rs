//! Health services - Liveness e readiness

use crate::core::{AppError, AppState};
use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, instrument};

pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "up" }))
}

/// Pronto solo se il database risponde
#[instrument(skip(state))]
pub async fn readiness(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| {
            error!("Database not reachable: {}", e);
            AppError::service_unavailable("Service Unavailable").with_details("Database down")
        })?;
    Ok(Json(json!({ "status": "up", "db": "up" })))
}
