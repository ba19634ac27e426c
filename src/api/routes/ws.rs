/**
 * Realtime feed — spec §4.5/§6.
 *
 * Generalizes `services/collaboration/websocket.rs`'s connection-handling
 * shape (split the socket, spawn a reader and a writer task) onto
 * BroadcastHub's per-participant `mpsc` sink instead of a shared
 * `tokio::sync::broadcast` channel.
 */
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::middleware::security::validate_websocket_origin;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub participant_id: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<Uuid>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, StatusCode> {
    if let Some(origin) = headers.get("origin").and_then(|v| v.to_str().ok()) {
        if !validate_websocket_origin(origin, std::slice::from_ref(&state.config.cors_origin)) {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    if state.coordinator.get_session(session_id).await.is_err() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, query.participant_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: Uuid, participant_id: String) {
    let mut rx = match state.coordinator.connect(session_id, participant_id.clone()).await {
        Ok(rx) => rx,
        Err(err) => {
            tracing::warn!(%session_id, %participant_id, error = %err, "connect failed");
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();

    let forward = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize broadcast event");
                    continue;
                }
            };
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Err(err) => {
                tracing::warn!(%session_id, %participant_id, error = %err, "websocket read error");
                break;
            }
            _ => {}
        }
    }

    forward.abort();
    state.coordinator.disconnect(session_id, &participant_id).await;
}
