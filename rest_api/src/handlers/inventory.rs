// rest_api/src/handlers/inventory.rs
//
// Every write path re-derives the stock status and appends to the
// quantity-change history where quantities move.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::errors::FleetError;
use models::{
    AuditAction, AuditLog, InventoryItem, NewInventoryItem, QuantityChange, UpdateInventoryItem,
};

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
        "InventoryItem",
        entity_id.to_string(),
        payload,
    );
    state.store.append_audit(entry).await?;
    Ok(())
}

fn validate_quantities(quantity: i64, min_stock: i64) -> Result<(), RestApiError> {
    if quantity < 0 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Quantity cannot be negative".to_string(),
        )));
    }
    if min_stock < 0 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Minimum stock cannot be negative".to_string(),
        )));
    }
    Ok(())
}

pub async fn list_handler(
    State(state): State<AppState>,
    Path(ambulance_id): Path<Uuid>,
) -> Result<Json<Vec<InventoryItem>>, RestApiError> {
    state.store.get_ambulance(ambulance_id).await?;
    Ok(Json(state.store.list_inventory(Some(ambulance_id)).await?))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Path(ambulance_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<NewInventoryItem>,
) -> Result<Json<InventoryItem>, RestApiError> {
    validate_quantities(payload.quantity, payload.min_stock)?;
    if payload.name.trim().is_empty() {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Material name must be set".to_string(),
        )));
    }
    let today = Utc::now().date_naive();
    let item = InventoryItem::from_new(payload, ambulance_id, today);
    let created = state.store.create_inventory_item(item).await?;
    audit(
        &state,
        &headers,
        AuditAction::Create,
        created.id,
        json!({"name": created.name, "quantity": created.quantity}),
    )
    .await?;
    Ok(Json(created))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, RestApiError> {
    Ok(Json(state.store.get_inventory_item(id).await?))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateInventoryItem>,
) -> Result<Json<InventoryItem>, RestApiError> {
    let mut item = state.store.get_inventory_item(id).await?;
    let quantity_before = item.quantity;

    if let Some(name) = payload.name {
        item.name = name;
    }
    if let Some(quantity) = payload.quantity {
        item.quantity = quantity;
    }
    if let Some(min_stock) = payload.min_stock {
        item.min_stock = min_stock;
    }
    if let Some(expiry_date) = payload.expiry_date {
        item.expiry_date = expiry_date;
    }
    if let Some(location) = payload.location {
        item.location = Some(location);
    }
    validate_quantities(item.quantity, item.min_stock)?;

    item.rederive_status(Utc::now().date_naive());
    item.updated_at = Utc::now();
    let updated = state.store.update_inventory_item(item).await?;

    if updated.quantity != quantity_before {
        let change = QuantityChange {
            id: Uuid::new_v4(),
            item_id: updated.id,
            delta: updated.quantity - quantity_before,
            resulting_quantity: updated.quantity,
            reason: "manual edit".to_string(),
            actor: actor(&state, &headers),
            created_at: Utc::now(),
        };
        state.store.append_quantity_change(change).await?;
    }

    audit(
        &state,
        &headers,
        AuditAction::Update,
        updated.id,
        json!({"name": updated.name, "quantity": updated.quantity, "status": updated.status}),
    )
    .await?;
    Ok(Json(updated))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestApiError> {
    state.store.delete_inventory_item(id).await?;
    audit(&state, &headers, AuditAction::Delete, id, json!({})).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Inventory item {} deleted.", id)
    })))
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: i64,
    pub reason: String,
}

// Handler for POST /api/v1/inventory/:id/adjust
pub async fn adjust_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<AdjustRequest>,
) -> Result<Json<InventoryItem>, RestApiError> {
    let mut item = state.store.get_inventory_item(id).await?;
    let new_quantity = item.quantity + payload.delta;
    if new_quantity < 0 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(format!(
            "Adjustment would leave a negative quantity ({})",
            new_quantity
        ))));
    }
    item.quantity = new_quantity;
    item.rederive_status(Utc::now().date_naive());
    item.updated_at = Utc::now();
    let updated = state.store.update_inventory_item(item).await?;

    let change = QuantityChange {
        id: Uuid::new_v4(),
        item_id: updated.id,
        delta: payload.delta,
        resulting_quantity: updated.quantity,
        reason: payload.reason,
        actor: actor(&state, &headers),
        created_at: Utc::now(),
    };
    state.store.append_quantity_change(change).await?;

    audit(
        &state,
        &headers,
        AuditAction::Update,
        updated.id,
        json!({"delta": payload.delta, "quantity": updated.quantity}),
    )
    .await?;
    Ok(Json(updated))
}

// Handler for GET /api/v1/inventory/:id/changes
pub async fn changes_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuantityChange>>, RestApiError> {
    state.store.get_inventory_item(id).await?;
    Ok(Json(state.store.list_quantity_changes(id).await?))
}
