// rest_api/src/handlers/reviews.rs
//
// Submitting a review record is what completes the matching workflow stage;
// the state machine takes care of flags and timestamps.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use lib::workflow;
use models::{
    CleaningLog, DailyVehicleCheck, MechanicalReview, NewCleaningLog, NewDailyVehicleCheck,
    NewMechanicalReview, WorkflowStage,
};

use crate::{AppState, RestApiError};

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MechanicalReview>>, RestApiError> {
    state.store.get_ambulance(id).await?;
    Ok(Json(state.store.list_mechanical_reviews(id).await?))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewMechanicalReview>,
) -> Result<Json<MechanicalReview>, RestApiError> {
    state.store.get_ambulance(id).await?;
    let review = state
        .store
        .append_mechanical_review(MechanicalReview::from_new(payload, id))
        .await?;
    workflow::complete_stage(&state.store, id, WorkflowStage::Mechanical, true).await?;
    Ok(Json(review))
}

pub async fn list_cleanings_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CleaningLog>>, RestApiError> {
    state.store.get_ambulance(id).await?;
    Ok(Json(state.store.list_cleaning_logs(id).await?))
}

pub async fn create_cleaning_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewCleaningLog>,
) -> Result<Json<CleaningLog>, RestApiError> {
    state.store.get_ambulance(id).await?;
    let log = state
        .store
        .append_cleaning_log(CleaningLog::from_new(payload, id))
        .await?;
    workflow::complete_stage(&state.store, id, WorkflowStage::Cleaning, true).await?;
    Ok(Json(log))
}

pub async fn list_daily_checks_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DailyVehicleCheck>>, RestApiError> {
    state.store.get_ambulance(id).await?;
    Ok(Json(state.store.list_daily_checks(id).await?))
}

pub async fn create_daily_check_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewDailyVehicleCheck>,
) -> Result<Json<DailyVehicleCheck>, RestApiError> {
    let mut ambulance = state.store.get_ambulance(id).await?;
    let check = state
        .store
        .append_daily_check(DailyVehicleCheck::from_new(payload, id))
        .await?;

    // The check-in carries the odometer reading.
    if check.kilometers > ambulance.last_known_kilometers {
        ambulance.last_known_kilometers = check.kilometers;
        ambulance.updated_at = Utc::now();
        state.store.update_ambulance(ambulance).await?;
    }

    workflow::complete_stage(&state.store, id, WorkflowStage::DailyCheck, true).await?;
    Ok(Json(check))
}
