// rest_api/src/handlers/kits.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use lib::kits::audit_kit;
use models::errors::FleetError;
use models::{KitAuditReport, NewUsvbKit, UsvbKit};

use crate::{AppState, RestApiError};

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<UsvbKit>>, RestApiError> {
    Ok(Json(state.store.list_kits().await?))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UsvbKit>, RestApiError> {
    Ok(Json(state.store.get_kit(id).await?))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewUsvbKit>,
) -> Result<Json<UsvbKit>, RestApiError> {
    if payload.name.trim().is_empty() {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Kit name must be set".to_string(),
        )));
    }
    if payload.materials.iter().any(|m| m.target_quantity < 0) {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Target quantities cannot be negative".to_string(),
        )));
    }
    let created = state.store.create_kit(UsvbKit::from_new(payload)).await?;
    Ok(Json(created))
}

// Handler for GET /api/v1/kits/:id/audit/:ambulance_id
pub async fn audit_handler(
    State(state): State<AppState>,
    Path((id, ambulance_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<KitAuditReport>, RestApiError> {
    let kit = state.store.get_kit(id).await?;
    state.store.get_ambulance(ambulance_id).await?;
    let items = state.store.list_inventory(Some(ambulance_id)).await?;
    Ok(Json(audit_kit(&kit, ambulance_id, &items)))
}
