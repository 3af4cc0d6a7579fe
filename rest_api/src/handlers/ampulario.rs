// rest_api/src/handlers/ampulario.rs

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::errors::FleetError;
use models::{
    AmpularioMaterial, AuditAction, AuditLog, NewAmpularioMaterial, Space,
    UpdateAmpularioMaterial,
};

use crate::{actor, AppState, RestApiError};

async fn audit(
    state: &AppState,
    headers: &HeaderMap,
    action: AuditAction,
    entity: &str,
    entity_id: Uuid,
    payload: Value,
) -> Result<(), RestApiError> {
    let entry = AuditLog::record(
        actor(state, headers),
        action,
        entity,
        entity_id.to_string(),
        payload,
    );
    state.store.append_audit(entry).await?;
    Ok(())
}

pub async fn list_spaces_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Space>>, RestApiError> {
    Ok(Json(state.store.list_spaces().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewSpaceRequest {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_space_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewSpaceRequest>,
) -> Result<Json<Space>, RestApiError> {
    if payload.name.trim().is_empty() {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Space name must be set".to_string(),
        )));
    }
    let created = state
        .store
        .create_space(Space::new(payload.name, payload.description))
        .await?;
    audit(
        &state,
        &headers,
        AuditAction::Create,
        "Space",
        created.id,
        json!({"name": created.name}),
    )
    .await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct MaterialFilter {
    pub space_id: Option<Uuid>,
}

pub async fn list_materials_handler(
    State(state): State<AppState>,
    Query(filter): Query<MaterialFilter>,
) -> Result<Json<Vec<AmpularioMaterial>>, RestApiError> {
    Ok(Json(state.store.list_ampulario_materials(filter.space_id).await?))
}

pub async fn get_material_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AmpularioMaterial>, RestApiError> {
    Ok(Json(state.store.get_ampulario_material(id).await?))
}

pub async fn create_material_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewAmpularioMaterial>,
) -> Result<Json<AmpularioMaterial>, RestApiError> {
    if payload.name.trim().is_empty() {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Material name must be set".to_string(),
        )));
    }
    if payload.quantity < 0 || payload.min_stock < 0 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Quantities cannot be negative".to_string(),
        )));
    }
    let today = Utc::now().date_naive();
    let created = state
        .store
        .create_ampulario_material(AmpularioMaterial::from_new(payload, today))
        .await?;
    audit(
        &state,
        &headers,
        AuditAction::Create,
        "AmpularioMaterial",
        created.id,
        json!({"name": created.name, "space_id": created.space_id}),
    )
    .await?;
    Ok(Json(created))
}

pub async fn update_material_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateAmpularioMaterial>,
) -> Result<Json<AmpularioMaterial>, RestApiError> {
    let mut material = state.store.get_ampulario_material(id).await?;
    if let Some(name) = payload.name {
        material.name = name;
    }
    if let Some(dose) = payload.dose {
        material.dose = Some(dose);
    }
    if let Some(unit) = payload.unit {
        material.unit = Some(unit);
    }
    if let Some(quantity) = payload.quantity {
        material.quantity = quantity;
    }
    if let Some(min_stock) = payload.min_stock {
        material.min_stock = min_stock;
    }
    if let Some(expiry_date) = payload.expiry_date {
        material.expiry_date = expiry_date;
    }
    if material.quantity < 0 || material.min_stock < 0 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Quantities cannot be negative".to_string(),
        )));
    }
    material.rederive_status(Utc::now().date_naive());
    material.updated_at = Utc::now();
    let updated = state.store.update_ampulario_material(material).await?;
    audit(
        &state,
        &headers,
        AuditAction::Update,
        "AmpularioMaterial",
        updated.id,
        json!({"name": updated.name, "quantity": updated.quantity, "status": updated.status}),
    )
    .await?;
    Ok(Json(updated))
}

pub async fn delete_material_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestApiError> {
    state.store.delete_ampulario_material(id).await?;
    audit(
        &state,
        &headers,
        AuditAction::Delete,
        "AmpularioMaterial",
        id,
        json!({}),
    )
    .await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Ampulario material {} deleted.", id)
    })))
}
