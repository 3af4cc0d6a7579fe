// rest_api/src/handlers/ambulances.rs

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use lib::workflow;
use models::errors::FleetError;
use models::{Ambulance, AuditAction, AuditLog, NewAmbulance, UpdateAmbulance, WorkflowStage};

use crate::{actor, AppState, RestApiError};

async fn audit(
    state: &AppState,
    headers: &HeaderMap,
    action: AuditAction,
    entity_id: Uuid,
    payload: Value,
) -> Result<(), RestApiError> {
    let entry = AuditLog::record(
        actor(state, headers),
        action,
        "Ambulance",
        entity_id.to_string(),
        payload,
    );
    state.store.append_audit(entry).await?;
    Ok(())
}

pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ambulance>>, RestApiError> {
    Ok(Json(state.store.list_ambulances().await?))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ambulance>, RestApiError> {
    Ok(Json(state.store.get_ambulance(id).await?))
}

pub async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewAmbulance>,
) -> Result<Json<Ambulance>, RestApiError> {
    if payload.code.trim().is_empty() || payload.plate.trim().is_empty() {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Ambulance code and plate must be set".to_string(),
        )));
    }
    let created = state.store.create_ambulance(Ambulance::from_new(payload)).await?;
    audit(
        &state,
        &headers,
        AuditAction::Create,
        created.id,
        json!({"code": created.code, "plate": created.plate}),
    )
    .await?;
    Ok(Json(created))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateAmbulance>,
) -> Result<Json<Ambulance>, RestApiError> {
    let mut ambulance = state.store.get_ambulance(id).await?;
    if let Some(code) = payload.code {
        ambulance.code = code;
    }
    if let Some(plate) = payload.plate {
        ambulance.plate = plate;
    }
    if let Some(vehicle_model) = payload.vehicle_model {
        ambulance.vehicle_model = Some(vehicle_model);
    }
    if let Some(year) = payload.year {
        ambulance.year = Some(year);
    }
    if let Some(kit_number) = payload.kit_number {
        ambulance.kit_number = Some(kit_number);
    }
    if let Some(kilometers) = payload.last_known_kilometers {
        ambulance.last_known_kilometers = kilometers;
    }
    if let Some(users) = payload.assigned_user_ids {
        ambulance.assigned_user_ids = users;
    }
    ambulance.updated_at = Utc::now();

    let updated = state.store.update_ambulance(ambulance).await?;
    audit(
        &state,
        &headers,
        AuditAction::Update,
        updated.id,
        json!({"code": updated.code}),
    )
    .await?;
    Ok(Json(updated))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestApiError> {
    state.store.delete_ambulance(id).await?;
    audit(&state, &headers, AuditAction::Delete, id, json!({})).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Ambulance {} deleted.", id)
    })))
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRequest {
    pub stage: String,
    pub status: bool,
}

// Handler for PUT /api/v1/ambulances/:id/workflow
pub async fn workflow_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkflowRequest>,
) -> Result<Json<Ambulance>, RestApiError> {
    let stage: WorkflowStage = payload.stage.parse()?;
    let updated = workflow::complete_stage(&state.store, id, stage, payload.status).await?;
    Ok(Json(updated))
}

// Handler for GET /api/v1/ambulances/:id/screen
pub async fn screen_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, RestApiError> {
    let ambulance = state.store.get_ambulance(id).await?;
    let screen = workflow::unlocked_screen(&ambulance);
    Ok(Json(json!({ "ambulance_id": id, "screen": screen })))
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub kilometers: u64,
}

// Handler for POST /api/v1/ambulances/:id/check-in
pub async fn check_in_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<Ambulance>, RestApiError> {
    let mut ambulance = state.store.get_ambulance(id).await?;
    if payload.kilometers < ambulance.last_known_kilometers {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(format!(
            "Kilometers cannot decrease (currently {})",
            ambulance.last_known_kilometers
        ))));
    }
    ambulance.last_known_kilometers = payload.kilometers;
    ambulance.updated_at = Utc::now();
    let updated = state.store.update_ambulance(ambulance).await?;
    audit(
        &state,
        &headers,
        AuditAction::Update,
        updated.id,
        json!({"kilometers": payload.kilometers}),
    )
    .await?;
    Ok(Json(updated))
}
