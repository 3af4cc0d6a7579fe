// rest_api/src/handlers/admin.rs
//
// Manual job triggers plus the read-only operational views. The triggers
// run the same pass functions as the scheduler, synchronously, and report
// the pass summary back to the caller.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use lib::bootstrap::{KEY_KIT_TEMPLATES, KEY_MECHANICAL_CHECKLIST};
use lib::jobs::{run_daily_pass, run_hourly_pass};
use models::errors::FleetError;
use models::{AuditLog, Notification, PublicUser};
use security::roles::{PERM_MANAGE_FLEET, PERM_MANAGE_JOBS, PERM_VIEW_AUDIT};

use crate::{authorize, AppState, RestApiError};

// Handler for POST /api/v1/jobs/daily
pub async fn trigger_daily_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestApiError> {
    authorize(&state, &headers, PERM_MANAGE_JOBS)?;
    let report = run_daily_pass(&state.job_ctx).await?;
    Ok(Json(json!({
        "status": "success",
        "report": report,
    })))
}

// Handler for POST /api/v1/jobs/hourly
pub async fn trigger_hourly_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestApiError> {
    authorize(&state, &headers, PERM_MANAGE_JOBS)?;
    let report = run_hourly_pass(&state.job_ctx).await?;
    Ok(Json(json!({
        "status": "success",
        "report": report,
    })))
}

// Handler for GET /api/v1/audit
pub async fn audit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AuditLog>>, RestApiError> {
    authorize(&state, &headers, PERM_VIEW_AUDIT)?;
    Ok(Json(state.store.list_audit().await?))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, RestApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, RestApiError> {
    Ok(Json(state.store.get_user(id).await?.into()))
}

fn template_key(name: &str) -> Result<&'static str, RestApiError> {
    match name {
        "mechanical-checklist" => Ok(KEY_MECHANICAL_CHECKLIST),
        "usvb-kits" => Ok(KEY_KIT_TEMPLATES),
        other => Err(RestApiError::Fleet(FleetError::InvalidInput(format!(
            "Unknown template: {}",
            other
        )))),
    }
}

// Handler for GET /api/v1/templates/:name
pub async fn get_template_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, RestApiError> {
    let key = template_key(&name)?;
    let value = state
        .config_store
        .get(key)
        .await?
        .ok_or_else(|| FleetError::not_found("Template", name))?;
    Ok(Json(value))
}

// Handler for PUT /api/v1/templates/:name
pub async fn put_template_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> Result<Json<Value>, RestApiError> {
    authorize(&state, &headers, PERM_MANAGE_FLEET)?;
    let key = template_key(&name)?;
    state.config_store.put(key, value).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Template '{}' updated.", name)
    })))
}

#[derive(Debug, Deserialize)]
pub struct NotificationFilter {
    pub recipient: Option<String>,
}

pub async fn list_notifications_handler(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Vec<Notification>>, RestApiError> {
    Ok(Json(
        state
            .store
            .list_notifications(filter.recipient.as_deref())
            .await?,
    ))
}
