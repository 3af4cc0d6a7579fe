// rest_api/src/handlers/meta.rs

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{AppState, RestApiError};

// Handler for the /api/v1/health endpoint
pub async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "Fleet REST API is healthy" })))
}

// Handler for the /api/v1/version endpoint
pub async fn version_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })))
}

// Handler for the /api/v1/shutdown endpoint
pub async fn shutdown_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, RestApiError> {
    let mut tx_guard = state.rest_api_shutdown_tx.lock().await;
    if let Some(tx) = tx_guard.take() {
        let _ = tx.send(());
        Ok(Json(json!({
            "status": "success",
            "message": "Shutting down REST API server."
        })))
    } else {
        Err(RestApiError::Anyhow(anyhow::anyhow!(
            "Shutdown signal already sent or not available."
        )))
    }
}
