/**
 * Itinerary routes — spec §6.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::model::ItineraryItem;

#[derive(Debug, Deserialize)]
pub struct AddToItineraryRequest {
    pub venue_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub added_by: String,
}

pub async fn add_to_itinerary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AddToItineraryRequest>,
) -> ApiResult<(StatusCode, Json<Vec<ItineraryItem>>)> {
    let items = state
        .coordinator
        .add_to_itinerary(session_id, request.venue_id, request.scheduled_time, request.added_by)
        .await?;
    Ok((StatusCode::CREATED, Json(items)))
}

pub async fn get_itinerary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ItineraryItem>>> {
    Ok(Json(state.coordinator.get_itinerary(session_id).await?))
}

pub async fn remove_from_itinerary(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.coordinator.remove_from_itinerary(session_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub item_ids: Vec<Uuid>,
}

pub async fn reorder_itinerary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<ItineraryItem>>> {
    let items = state
        .coordinator
        .reorder_itinerary(session_id, request.item_ids)
        .await?;
    Ok(Json(items))
}
