/**
 * Venue catalog and voting routes — spec §6.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::model::{RankedVenue, Tally, VenueOption, Vote, VoteType};

#[derive(Debug, Deserialize)]
pub struct AddVenueRequest {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub suggested_by: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

pub async fn add_venue(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AddVenueRequest>,
) -> ApiResult<(StatusCode, Json<VenueOption>)> {
    let venue = state
        .coordinator
        .add_venue(
            session_id,
            request.place_id,
            request.name,
            request.address,
            request.suggested_by,
            request.rating,
            request.price_level,
            request.photo_url,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

pub async fn get_venues(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<VenueOption>>> {
    Ok(Json(state.coordinator.get_venues(session_id).await?))
}

pub async fn rank_venues(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RankedVenue>>> {
    Ok(Json(state.coordinator.rank_venues(session_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub participant_id: String,
    pub vote_type: VoteType,
}

#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub vote: Vote,
    pub tally: Tally,
}

pub async fn cast_vote(
    State(state): State<AppState>,
    Path((session_id, venue_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CastVoteRequest>,
) -> ApiResult<Json<CastVoteResponse>> {
    let (vote, tally) = state
        .coordinator
        .cast_vote(session_id, venue_id, request.participant_id, request.vote_type)
        .await?;
    Ok(Json(CastVoteResponse { vote, tally }))
}
