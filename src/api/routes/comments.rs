/**
 * Comment routes — spec §6.
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::core::model::Comment;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub participant_id: String,
    pub text: String,
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path((session_id, venue_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .coordinator
        .add_comment(session_id, venue_id, request.participant_id, request.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Path((session_id, venue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.coordinator.get_comments(session_id, venue_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ParticipantCommentsQuery {
    pub participant_id: String,
}

pub async fn get_participant_comments(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<ParticipantCommentsQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(
        state
            .coordinator
            .get_participant_comments(session_id, &query.participant_id)
            .await?,
    ))
}
