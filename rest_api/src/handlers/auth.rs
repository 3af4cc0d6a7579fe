// rest_api/src/handlers/auth.rs

use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use models::errors::FleetError;
use models::{AuditAction, AuditLog, Login, NewUser, PublicUser, User};
use security::{create_jwt, verify_login};

use crate::{actor, AppState, RestApiError};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role_id: u32,
}

// Handler for /api/v1/auth/register
pub async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewUser>,
) -> Result<Json<PublicUser>, RestApiError> {
    if payload.username.trim().is_empty() || payload.password.len() < 8 {
        return Err(RestApiError::Fleet(FleetError::InvalidInput(
            "Username must be set and password at least 8 characters".to_string(),
        )));
    }
    let user = User::from_new_user(payload)
        .map_err(|e| FleetError::InternalError(format!("Password hashing failed: {}", e)))?;
    let created = state.store.create_user(user).await?;

    let entry = AuditLog::record(
        actor(&state, &headers),
        AuditAction::Create,
        "User",
        created.id.to_string(),
        json!({"username": created.username}),
    );
    state.store.append_audit(entry).await?;

    Ok(Json(created.into()))
}

// Handler for /api/v1/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<Login>,
) -> Result<Json<AuthResponse>, RestApiError> {
    let user = state
        .store
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(|| RestApiError::Unauthorized("Invalid username or password".to_string()))?;

    verify_login(&user, &payload.password)
        .map_err(|e| RestApiError::Unauthorized(e.to_string()))?;

    let token = create_jwt(&user, &state.jwt_secret)
        .map_err(|e| RestApiError::Unauthorized(e.to_string()))?;

    let mut updated = user.clone();
    updated.last_login = Some(Utc::now());
    state.store.update_user(updated).await?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        role_id: user.role_id,
    }))
}
