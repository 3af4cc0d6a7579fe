// rest_api/src/handlers/alerts.rs

use axum::{extract::State, Json};
use chrono::Utc;

use lib::alerts::derive_alerts;
use models::Alert;

use crate::{AppState, RestApiError};

// Handler for GET /api/v1/alerts. The list is recomputed from current
// entity state on every request; nothing is cached or persisted here.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, RestApiError> {
    let ambulances = state.store.list_ambulances().await?;
    let items = state.store.list_inventory(None).await?;
    let ampulario = state.store.list_ampulario_materials(None).await?;
    let incidents = state.store.list_incidents().await?;
    let today = Utc::now().date_naive();

    Ok(Json(derive_alerts(
        &ambulances,
        &items,
        &ampulario,
        &incidents,
        today,
    )))
}
