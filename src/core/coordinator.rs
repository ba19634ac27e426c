/**
 * Coordinator — spec §4.7 & §5.
 *
 * Single public entry point. Every mutation acquires a per-session
 * exclusive lock, rechecks the lifecycle gate, delegates to the owning
 * component, persists (inside the owning component's store call), captures
 * the resulting broadcast event, releases the lock, then dispatches the
 * event to BroadcastHub — matching §5's "event is captured before the lock
 * is released and dispatched after" suspension-point guidance.
 */
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::broadcast::{BroadcastEvent, BroadcastHub, EventType, SinkReceiver};
use super::clock::Clock;
use super::comments::CommentLog;
use super::error::{CoreError, CoreResult};
use super::ids::IdGenerator;
use super::itinerary::ItineraryBook;
use super::model::{
    Comment, ItineraryItem, Participant, RankedVenue, Session, SessionState, SessionSummary,
    Tally, VenueOption, Vote, VoteType,
};
use super::registry::SessionRegistry;
use super::state_sync::StateSync;
use super::store::Store;
use super::summary::SummaryBuilder;
use super::token::TokenGenerator;
use super::votes::VoteEngine;

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Per-session exclusive locks, created lazily and kept for the process
/// lifetime. Distinct sessions never contend with one another.
#[derive(Default)]
struct SessionLocks {
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    async fn handle(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.read().await.get(&session_id) {
            return Arc::clone(existing);
        }
        let mut guard = self.locks.write().await;
        Arc::clone(
            guard
                .entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    async fn acquire(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        self.handle(session_id).await.lock_owned().await
    }
}

pub struct Coordinator {
    store: Arc<dyn Store>,
    registry: Arc<SessionRegistry>,
    votes: Arc<VoteEngine>,
    itinerary: Arc<ItineraryBook>,
    comments: Arc<CommentLog>,
    hub: Arc<BroadcastHub>,
    summaries: Arc<SummaryBuilder>,
    state_sync: Arc<StateSync>,
    locks: SessionLocks,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        tokens: Arc<dyn TokenGenerator>,
        invite_base_url: String,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&ids),
            tokens,
        ));
        let votes = Arc::new(VoteEngine::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&ids),
        ));
        let itinerary = Arc::new(ItineraryBook::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&ids),
        ));
        let comments = Arc::new(CommentLog::new(Arc::clone(&store), clock, ids));
        let hub = Arc::new(BroadcastHub::new());
        let summaries = Arc::new(SummaryBuilder::new(invite_base_url));
        let state_sync = Arc::new(StateSync::new(
            Arc::clone(&registry),
            Arc::clone(&votes),
            Arc::clone(&itinerary),
            Arc::clone(&comments),
        ));

        Self {
            store,
            registry,
            votes,
            itinerary,
            comments,
            hub,
            summaries,
            state_sync,
            locks: SessionLocks::default(),
        }
    }

    /// Connectivity probe for `/health`, delegated straight to the backing store.
    pub async fn store_health_check(&self) -> anyhow::Result<()> {
        self.store.health_check().await
    }

    // ---- SessionRegistry passthroughs ------------------------------------

    pub async fn create_session(
        &self,
        organizer_id: String,
        name: String,
        expiry_hours: i64,
    ) -> CoreResult<Session> {
        self.registry.create_session(organizer_id, name, expiry_hours).await
    }

    pub async fn get_session(&self, session_id: Uuid) -> CoreResult<Session> {
        self.registry.get_session(session_id).await
    }

    pub async fn get_session_by_token(&self, token: &str) -> CoreResult<Session> {
        self.registry.get_session_by_token(token).await
    }

    pub async fn join_session(
        &self,
        token: &str,
        display_name: String,
        participant_id: Option<String>,
    ) -> CoreResult<(Session, Participant)> {
        let session = self.registry.get_session_by_token(token).await?;
        let _guard = self.locks.acquire(session.id).await;

        let (session, participant) = self
            .registry
            .join_session(token, display_name, participant_id)
            .await?;

        let event = BroadcastEvent::new(
            EventType::ParticipantJoined,
            session.id,
            to_json(&participant),
        )
        .from_originator(participant.id.clone());
        drop(_guard);
        self.hub.broadcast(session.id, event).await;

        Ok((session, participant))
    }

    pub async fn revoke_invite(&self, session_id: Uuid, caller_id: &str) -> CoreResult<Session> {
        let _guard = self.locks.acquire(session_id).await;
        self.registry.revoke_invite(session_id, caller_id).await
    }

    pub async fn finalize_session(
        &self,
        session_id: Uuid,
        caller_id: &str,
    ) -> CoreResult<SessionSummary> {
        let _guard = self.locks.acquire(session_id).await;

        let participants = self.registry.list_participants(session_id).await?;
        let itinerary_snapshot = self.itinerary.get_itinerary(session_id).await?;
        let session = self.registry.finalize_session(session_id, caller_id).await?;
        let summary = self.summaries.build(&session, participants, itinerary_snapshot);

        let event = BroadcastEvent::new(EventType::SessionFinalized, session_id, to_json(&summary));
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok(summary)
    }

    pub async fn archive_inactive(&self, cutoff_age: Duration) -> CoreResult<usize> {
        self.registry.archive_inactive(cutoff_age).await
    }

    pub async fn list_participants(&self, session_id: Uuid) -> CoreResult<Vec<Participant>> {
        self.registry.list_participants(session_id).await
    }

    // ---- VoteEngine -------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn add_venue(
        &self,
        session_id: Uuid,
        place_id: String,
        name: String,
        address: String,
        suggested_by: String,
        rating: Option<f32>,
        price_level: Option<u8>,
        photo_url: Option<String>,
    ) -> CoreResult<VenueOption> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;

        let venue = self
            .votes
            .add_venue(
                session_id, place_id, name, address, suggested_by, rating, price_level, photo_url,
            )
            .await?;

        let event = BroadcastEvent::new(EventType::VenueAdded, session_id, to_json(&venue))
            .from_originator(venue.suggested_by.clone());
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok(venue)
    }

    pub async fn get_venues(&self, session_id: Uuid) -> CoreResult<Vec<VenueOption>> {
        self.votes.get_venues(session_id).await
    }

    pub async fn cast_vote(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        participant_id: String,
        vote_type: VoteType,
    ) -> CoreResult<(Vote, Tally)> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;

        let (vote, tally) = self
            .votes
            .cast_vote(session_id, venue_id, participant_id.clone(), vote_type)
            .await?;

        let event = BroadcastEvent::new(
            EventType::VoteCast,
            session_id,
            serde_json::json!({ "vote": vote, "tally": tally }),
        )
        .from_originator(participant_id);
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok((vote, tally))
    }

    pub async fn tally(&self, session_id: Uuid, venue_id: Uuid) -> CoreResult<Tally> {
        self.votes.tally(session_id, venue_id).await
    }

    pub async fn rank_venues(&self, session_id: Uuid) -> CoreResult<Vec<RankedVenue>> {
        self.votes.rank_venues(session_id).await
    }

    // ---- ItineraryBook ------------------------------------------------------

    pub async fn add_to_itinerary(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        scheduled_time: DateTime<Utc>,
        added_by: String,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;

        let items = self
            .itinerary
            .add_to_itinerary(session_id, venue_id, scheduled_time, added_by.clone())
            .await?;

        let event = BroadcastEvent::new(EventType::ItineraryItemAdded, session_id, to_json(&items))
            .from_originator(added_by);
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok(items)
    }

    pub async fn remove_from_itinerary(
        &self,
        session_id: Uuid,
        item_id: Uuid,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;

        let items = self.itinerary.remove_from_itinerary(session_id, item_id).await?;

        let event = BroadcastEvent::new(EventType::ItineraryItemRemoved, session_id, to_json(&items));
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok(items)
    }

    pub async fn get_itinerary(&self, session_id: Uuid) -> CoreResult<Vec<ItineraryItem>> {
        self.itinerary.get_itinerary(session_id).await
    }

    pub async fn reorder_itinerary(
        &self,
        session_id: Uuid,
        ordered_item_ids: Vec<Uuid>,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;
        self.itinerary.reorder(session_id, ordered_item_ids).await
    }

    // ---- CommentLog ---------------------------------------------------------

    pub async fn add_comment(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        participant_id: String,
        text: String,
    ) -> CoreResult<Comment> {
        let _guard = self.locks.acquire(session_id).await;
        self.require_active(session_id).await?;
        self.votes.get_venues(session_id).await.and_then(|venues| {
            if venues.iter().any(|v| v.id == venue_id) {
                Ok(())
            } else {
                Err(CoreError::VenueNotFound(venue_id.to_string()))
            }
        })?;

        let comment = self
            .comments
            .add_comment(session_id, venue_id, participant_id.clone(), text)
            .await?;

        let event = BroadcastEvent::new(EventType::CommentAdded, session_id, to_json(&comment))
            .from_originator(participant_id);
        drop(_guard);
        self.hub.broadcast(session_id, event).await;

        Ok(comment)
    }

    pub async fn get_comments(&self, session_id: Uuid, venue_id: Uuid) -> CoreResult<Vec<Comment>> {
        self.comments.get_comments(session_id, venue_id).await
    }

    pub async fn get_participant_comments(
        &self,
        session_id: Uuid,
        participant_id: &str,
    ) -> CoreResult<Vec<Comment>> {
        self.comments.get_participant_comments(session_id, participant_id).await
    }

    // ---- Connections & state sync ------------------------------------------

    /// Registers `participant_id`'s sink and delivers the authoritative
    /// `StateSync` before returning, so nothing the caller observes on the
    /// returned receiver predates this snapshot.
    pub async fn connect(&self, session_id: Uuid, participant_id: String) -> CoreResult<SinkReceiver> {
        let _guard = self.locks.acquire(session_id).await;
        let rx = self.hub.connect(session_id, participant_id.clone()).await;
        let state = self.state_sync.compose(session_id).await?;
        self.hub.sync_state(session_id, &participant_id, &state).await;
        Ok(rx)
    }

    pub async fn disconnect(&self, session_id: Uuid, participant_id: &str) {
        self.hub.disconnect(session_id, participant_id).await;
    }

    pub async fn get_state(&self, session_id: Uuid) -> CoreResult<SessionState> {
        let _guard = self.locks.acquire(session_id).await;
        self.state_sync.compose(session_id).await
    }

    async fn require_active(&self, session_id: Uuid) -> CoreResult<()> {
        let session = self.registry.get_session(session_id).await?;
        SessionRegistry::require_active(&session)
    }
}
