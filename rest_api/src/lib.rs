// rest_api/src/lib.rs

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use anyhow::Context;
use anyhow::Error as AnyhowError;

use lib::{ConfigStore, FleetStore, JobContext};
use models::errors::FleetError;
use security::{decode_jwt, Claims, RolesConfig};

pub mod config;
mod handlers;

pub use crate::config::{load_rest_api_config, RestApiConfig};

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] AnyhowError),
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            RestApiError::Fleet(FleetError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            RestApiError::Fleet(FleetError::Conflict(_)) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            RestApiError::Fleet(FleetError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            RestApiError::Fleet(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            RestApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            RestApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            RestApiError::SerdeJson(e) => (StatusCode::BAD_REQUEST, format!("JSON error: {}", e)),
            RestApiError::Anyhow(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", e))
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config_store: Arc<ConfigStore>,
    pub job_ctx: Arc<JobContext>,
    pub roles: Arc<RolesConfig>,
    pub jwt_secret: Arc<Vec<u8>>,
    pub rest_api_shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Decodes the bearer token and checks the named permission against the
/// caller's role.
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    permission: &str,
) -> Result<Claims, RestApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| RestApiError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = decode_jwt(token, &state.jwt_secret)
        .map_err(|e| RestApiError::Unauthorized(e.to_string()))?;
    if !state.roles.has_permission(claims.role_id, permission) {
        return Err(RestApiError::Forbidden(format!(
            "Role {} lacks permission '{}'",
            claims.role_id, permission
        )));
    }
    Ok(claims)
}

/// Audit actor: the authenticated username when a valid token is present,
/// "anonymous" otherwise.
pub(crate) fn actor(state: &AppState, headers: &HeaderMap) -> String {
    bearer_token(headers)
        .and_then(|token| decode_jwt(token, &state.jwt_secret).ok())
        .map(|claims| claims.sub)
        .unwrap_or_else(|| "anonymous".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::meta::health_check_handler))
        .route("/api/v1/version", get(handlers::meta::version_handler))
        .route("/api/v1/shutdown", get(handlers::meta::shutdown_handler))
        .route("/api/v1/auth/register", post(handlers::auth::register_handler))
        .route("/api/v1/auth/login", post(handlers::auth::login_handler))
        .route(
            "/api/v1/ambulances",
            get(handlers::ambulances::list_handler).post(handlers::ambulances::create_handler),
        )
        .route(
            "/api/v1/ambulances/:id",
            get(handlers::ambulances::get_handler)
                .put(handlers::ambulances::update_handler)
                .delete(handlers::ambulances::delete_handler),
        )
        .route(
            "/api/v1/ambulances/:id/workflow",
            put(handlers::ambulances::workflow_handler),
        )
        .route(
            "/api/v1/ambulances/:id/screen",
            get(handlers::ambulances::screen_handler),
        )
        .route(
            "/api/v1/ambulances/:id/check-in",
            post(handlers::ambulances::check_in_handler),
        )
        .route(
            "/api/v1/ambulances/:id/reviews",
            get(handlers::reviews::list_reviews_handler)
                .post(handlers::reviews::create_review_handler),
        )
        .route(
            "/api/v1/ambulances/:id/cleanings",
            get(handlers::reviews::list_cleanings_handler)
                .post(handlers::reviews::create_cleaning_handler),
        )
        .route(
            "/api/v1/ambulances/:id/daily-checks",
            get(handlers::reviews::list_daily_checks_handler)
                .post(handlers::reviews::create_daily_check_handler),
        )
        .route(
            "/api/v1/ambulances/:id/inventory",
            get(handlers::inventory::list_handler).post(handlers::inventory::create_handler),
        )
        .route(
            "/api/v1/inventory/:id",
            get(handlers::inventory::get_handler)
                .put(handlers::inventory::update_handler)
                .delete(handlers::inventory::delete_handler),
        )
        .route(
            "/api/v1/inventory/:id/adjust",
            post(handlers::inventory::adjust_handler),
        )
        .route(
            "/api/v1/inventory/:id/changes",
            get(handlers::inventory::changes_handler),
        )
        .route("/api/v1/alerts", get(handlers::alerts::list_handler))
        .route(
            "/api/v1/incidents",
            get(handlers::incidents::list_handler).post(handlers::incidents::create_handler),
        )
        .route("/api/v1/incidents/:id", get(handlers::incidents::get_handler))
        .route(
            "/api/v1/incidents/:id/status",
            put(handlers::incidents::status_handler),
        )
        .route(
            "/api/v1/spaces",
            get(handlers::ampulario::list_spaces_handler)
                .post(handlers::ampulario::create_space_handler),
        )
        .route(
            "/api/v1/ampulario",
            get(handlers::ampulario::list_materials_handler)
                .post(handlers::ampulario::create_material_handler),
        )
        .route(
            "/api/v1/ampulario/:id",
            get(handlers::ampulario::get_material_handler)
                .put(handlers::ampulario::update_material_handler)
                .delete(handlers::ampulario::delete_material_handler),
        )
        .route(
            "/api/v1/kits",
            get(handlers::kits::list_handler).post(handlers::kits::create_handler),
        )
        .route("/api/v1/kits/:id", get(handlers::kits::get_handler))
        .route(
            "/api/v1/kits/:id/audit/:ambulance_id",
            get(handlers::kits::audit_handler),
        )
        .route("/api/v1/jobs/daily", post(handlers::admin::trigger_daily_handler))
        .route("/api/v1/jobs/hourly", post(handlers::admin::trigger_hourly_handler))
        .route("/api/v1/audit", get(handlers::admin::audit_handler))
        .route(
            "/api/v1/templates/:name",
            get(handlers::admin::get_template_handler)
                .put(handlers::admin::put_template_handler),
        )
        .route("/api/v1/users", get(handlers::admin::list_users_handler))
        .route("/api/v1/users/:id", get(handlers::admin::get_user_handler))
        .route(
            "/api/v1/notifications",
            get(handlers::admin::list_notifications_handler),
        )
        .with_state(state)
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(
    port: u16,
    state: AppState,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), AnyhowError> {
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("REST API server listening on {}", addr);

    let (tx, rx_internal) = oneshot::channel();
    *state.rest_api_shutdown_tx.lock().await = Some(tx);

    let combined_shutdown_signal = async {
        tokio::select! {
            _ = shutdown_rx => {
                info!("Received external shutdown signal.");
            }
            _ = rx_internal => {
                info!("Received internal shutdown signal.");
            }
        }
    };

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(combined_shutdown_signal)
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped.");
    Ok(())
}
