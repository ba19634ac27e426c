/**
 * Session lifecycle routes — spec §6.
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
use crate::core::model::{Participant, Session, SessionSummary};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub organizer_id: String,
    pub name: String,
    #[serde(default)]
    pub expiry_hours: Option<i64>,
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let expiry_hours = request
        .expiry_hours
        .unwrap_or(state.config.default_expiry_hours);
    let session = state
        .coordinator
        .create_session(request.organizer_id, request.name, expiry_hours)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.coordinator.get_session(session_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub display_name: String,
    #[serde(default)]
    pub participant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinSessionResponse {
    pub session: Session,
    pub participant: Participant,
}

pub async fn join_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<JoinSessionRequest>,
) -> ApiResult<(StatusCode, Json<JoinSessionResponse>)> {
    let (session, participant) = state
        .coordinator
        .join_session(&token, request.display_name, request.participant_id)
        .await?;
    Ok((StatusCode::CREATED, Json(JoinSessionResponse { session, participant })))
}

pub async fn list_participants(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Participant>>> {
    Ok(Json(state.coordinator.list_participants(session_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CallerRequest {
    pub caller_id: String,
}

pub async fn revoke_invite(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CallerRequest>,
) -> ApiResult<StatusCode> {
    state
        .coordinator
        .revoke_invite(session_id, &request.caller_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn finalize_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CallerRequest>,
) -> ApiResult<Json<SessionSummary>> {
    let summary = state
        .coordinator
        .finalize_session(session_id, &request.caller_id)
        .await?;
    Ok(Json(summary))
}
