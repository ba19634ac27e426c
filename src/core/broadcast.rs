/**
 * BroadcastHub — spec §4.5.
 *
 * Generalizes `services/collaboration/websocket.rs`'s
 * `CollaborationWebSocket` connection registry (a `RwLock<HashMap<...>>` of
 * per-session senders) onto per-*participant* sinks: each connected
 * participant gets its own unbounded queue, so a slow or dead sink can never
 * hold up delivery to anyone else, and each sink sees its events in the
 * order they were submitted.
 */
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::model::SessionState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ParticipantJoined,
    VenueAdded,
    VoteCast,
    ItineraryItemAdded,
    ItineraryItemRemoved,
    CommentAdded,
    SessionFinalized,
    StateSync,
}

/// Wire shape for a single WebSocket frame (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BroadcastEvent {
    pub event_type: EventType,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
}

impl BroadcastEvent {
    pub fn new(event_type: EventType, session_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            event_type,
            session_id,
            timestamp: Utc::now(),
            data,
            participant_id: None,
        }
    }

    pub fn from_originator(mut self, participant_id: impl Into<String>) -> Self {
        self.participant_id = Some(participant_id.into());
        self
    }
}

pub fn state_sync_event(session_id: Uuid, state: &SessionState) -> BroadcastEvent {
    BroadcastEvent {
        event_type: EventType::StateSync,
        session_id,
        timestamp: Utc::now(),
        data: serde_json::to_value(state).unwrap_or(serde_json::Value::Null),
        participant_id: None,
    }
}

pub type Sink = mpsc::UnboundedSender<BroadcastEvent>;
pub type SinkReceiver = mpsc::UnboundedReceiver<BroadcastEvent>;

type SessionConnections = HashMap<String, Sink>;

/// Per-session connection registry. Each session's connection map is behind
/// its own lock so `Broadcast` and `Connect` on *different* sessions never
/// contend, matching spec §5's "fine-grained lock permitting concurrent
/// Broadcast vs. Connect".
#[derive(Default)]
pub struct BroadcastHub {
    sessions: RwLock<HashMap<Uuid, Arc<RwLock<SessionConnections>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    async fn session_connections(&self, session_id: Uuid) -> Arc<RwLock<SessionConnections>> {
        if let Some(existing) = self.sessions.read().await.get(&session_id) {
            return Arc::clone(existing);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(session_id)
                .or_insert_with(|| Arc::new(RwLock::new(HashMap::new()))),
        )
    }

    /// Registers a new sink for `participant_id`, evicting any existing one
    /// (spec §5 "Reconnection semantics": dropping the old sender ends the
    /// old connection's forwarding task).
    pub async fn connect(&self, session_id: Uuid, participant_id: String) -> SinkReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let connections = self.session_connections(session_id).await;
        connections.write().await.insert(participant_id, tx);
        rx
    }

    pub async fn disconnect(&self, session_id: Uuid, participant_id: &str) {
        let connections = self.session_connections(session_id).await;
        connections.write().await.remove(participant_id);
    }

    /// Delivers `event` to every sink currently connected to `session_id`.
    /// A closed sink (participant gone) is dropped from the registry;
    /// nothing else is affected.
    pub async fn broadcast(&self, session_id: Uuid, event: BroadcastEvent) {
        let connections = self.session_connections(session_id).await;
        let dead: Vec<String> = {
            let guard = connections.read().await;
            guard
                .iter()
                .filter_map(|(participant_id, sink)| {
                    if sink.send(event.clone()).is_err() {
                        Some(participant_id.clone())
                    } else {
                        None
                    }
                })
                .collect()
        };
        if !dead.is_empty() {
            let mut guard = connections.write().await;
            for participant_id in dead {
                guard.remove(&participant_id);
            }
        }
    }

    /// Delivers a targeted `StateSync` to exactly one sink. Dropped
    /// silently if the participant has already disconnected.
    pub async fn sync_state(&self, session_id: Uuid, participant_id: &str, state: &SessionState) {
        let connections = self.session_connections(session_id).await;
        let guard = connections.read().await;
        if let Some(sink) = guard.get(participant_id) {
            let _ = sink.send(state_sync_event(session_id, state));
        }
    }

    pub async fn connected_count(&self, session_id: Uuid) -> usize {
        self.session_connections(session_id).await.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SessionStatus;

    fn empty_state(session_id: Uuid) -> SessionState {
        SessionState {
            session_id,
            status: SessionStatus::Active,
            participants: vec![],
            venues: vec![],
            itinerary: vec![],
            tallies: HashMap::new(),
            comments: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connected_sink_and_skips_the_rest() {
        let hub = BroadcastHub::new();
        let session_id = Uuid::new_v4();
        let mut rx_a = hub.connect(session_id, "a".to_string()).await;
        let mut rx_b = hub.connect(session_id, "b".to_string()).await;

        hub.broadcast(
            session_id,
            BroadcastEvent::new(EventType::VenueAdded, session_id, serde_json::json!({})),
        )
        .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn reconnect_evicts_the_old_sink() {
        let hub = BroadcastHub::new();
        let session_id = Uuid::new_v4();
        let mut first = hub.connect(session_id, "a".to_string()).await;
        let mut second = hub.connect(session_id, "a".to_string()).await;

        hub.broadcast(
            session_id,
            BroadcastEvent::new(EventType::VenueAdded, session_id, serde_json::json!({})),
        )
        .await;

        assert!(first.try_recv().is_err());
        assert!(second.try_recv().is_ok());
    }

    #[tokio::test]
    async fn sync_state_targets_a_single_participant() {
        let hub = BroadcastHub::new();
        let session_id = Uuid::new_v4();
        let mut rx_a = hub.connect(session_id, "a".to_string()).await;
        let mut rx_b = hub.connect(session_id, "b".to_string()).await;

        hub.sync_state(session_id, "a", &empty_state(session_id)).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }
}
