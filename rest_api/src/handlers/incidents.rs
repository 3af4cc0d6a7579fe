// rest_api/src/handlers/incidents.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{Incident, IncidentStatus, NewIncident};

use crate::{AppState, RestApiError};

pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Incident>>, RestApiError> {
    Ok(Json(state.store.list_incidents().await?))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Incident>, RestApiError> {
    Ok(Json(state.store.get_incident(id).await?))
}

// Manual incident creation; the scheduled job is the other producer.
pub async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewIncident>,
) -> Result<Json<Incident>, RestApiError> {
    if let Some(ambulance_id) = payload.ambulance_id {
        state.store.get_ambulance(ambulance_id).await?;
    }
    if let Some(item_id) = payload.item_id {
        state.store.get_inventory_item(item_id).await?;
    }
    let created = state.store.create_incident(Incident::from_new(payload)).await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: IncidentStatus,
}

// Handler for PUT /api/v1/incidents/:id/status. Incidents are never
// deleted; they only move through their lifecycle.
pub async fn status_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Incident>, RestApiError> {
    let mut incident = state.store.get_incident(id).await?;
    incident.transition_to(payload.status)?;
    let updated = state.store.update_incident(incident).await?;
    Ok(Json(updated))
}
