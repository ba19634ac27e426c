/**
 * In-memory Store implementation.
 *
 * Generalizes the in-memory `HashMap` fallback path of `session.rs` (which
 * only existed there as a cache-miss backstop behind Postgres) into the
 * default, fully functional backing store. Used by the reference binary
 * when `DATABASE_URL` is unset, and by every test in this crate.
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::model::{Comment, ItineraryItem, Participant, Session, VenueOption, Vote};
use crate::core::store::Store;

#[derive(Default)]
struct Tables {
    sessions: HashMap<Uuid, Session>,
    token_index: HashMap<String, Uuid>,
    participants: HashMap<Uuid, Vec<Participant>>,
    venues: HashMap<Uuid, Vec<VenueOption>>,
    // (venue_id, participant_id) -> Vote
    votes: HashMap<(Uuid, String), Vote>,
    itinerary: HashMap<Uuid, Vec<ItineraryItem>>,
    comments: HashMap<Uuid, Vec<Comment>>,
}

/// Default `Store` backing: one `RwLock`-guarded set of tables, keyed by
/// session id. Concurrency-safe; independent of the Coordinator's
/// per-session lock (§5 requires the Store interface itself be thread-safe
/// regardless of what serializes callers).
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_session(&self, session: Session) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables.token_index.insert(session.invite_token.clone(), session.id);
        tables.sessions.insert(session.id, session);
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn get_session_by_token(&self, token: &str) -> anyhow::Result<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .token_index
            .get(token)
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn update_session(&self, session: Session) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .token_index
            .insert(session.invite_token.clone(), session.id);
        tables.sessions.insert(session.id, session);
        Ok(())
    }

    async fn list_sessions_for_archival(
        &self,
        cutoff: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Session>> {
        use crate::core::model::SessionStatus;
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .filter(|s| s.status != SessionStatus::Archived && s.updated_at < cutoff)
            .cloned()
            .collect())
    }

    async fn add_participant(&self, participant: Participant) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .participants
            .entry(participant.session_id)
            .or_default()
            .push(participant);
        Ok(())
    }

    async fn list_participants(&self, session_id: Uuid) -> anyhow::Result<Vec<Participant>> {
        Ok(self
            .tables
            .read()
            .await
            .participants
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_venue(&self, venue: VenueOption) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables.venues.entry(venue.session_id).or_default().push(venue);
        Ok(())
    }

    async fn get_venue(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
    ) -> anyhow::Result<Option<VenueOption>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .get(&session_id)
            .and_then(|vs| vs.iter().find(|v| v.id == venue_id))
            .cloned())
    }

    async fn list_venues(&self, session_id: Uuid) -> anyhow::Result<Vec<VenueOption>> {
        Ok(self
            .tables
            .read()
            .await
            .venues
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_vote(
        &self,
        venue_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Option<Vote>> {
        Ok(self
            .tables
            .read()
            .await
            .votes
            .get(&(venue_id, participant_id.to_string()))
            .cloned())
    }

    async fn upsert_vote(&self, vote: Vote) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .votes
            .insert((vote.venue_id, vote.participant_id.clone()), vote);
        Ok(())
    }

    async fn list_votes_for_venue(&self, venue_id: Uuid) -> anyhow::Result<Vec<Vote>> {
        Ok(self
            .tables
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.venue_id == venue_id)
            .cloned()
            .collect())
    }

    async fn list_itinerary(&self, session_id: Uuid) -> anyhow::Result<Vec<ItineraryItem>> {
        Ok(self
            .tables
            .read()
            .await
            .itinerary
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_itinerary(
        &self,
        session_id: Uuid,
        items: Vec<ItineraryItem>,
    ) -> anyhow::Result<()> {
        self.tables.write().await.itinerary.insert(session_id, items);
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .entry(comment.venue_id)
            .or_default()
            .push(comment);
        Ok(())
    }

    async fn list_comments_for_venue(
        &self,
        _session_id: Uuid,
        venue_id: Uuid,
    ) -> anyhow::Result<Vec<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .get(&venue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_comments_for_participant(
        &self,
        session_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut out: Vec<Comment> = tables
            .comments
            .values()
            .flatten()
            .filter(|c| c.session_id == session_id && c.participant_id == participant_id)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.created_at);
        Ok(out)
    }
}
