/**
 * Abstract persistence.
 *
 * Generalizes `database/mod.rs`'s concrete `Database` wrapper into a trait:
 * the Coordinator and its components depend only on `Store`, never on a
 * concrete backend. `src/store/memory.rs` is the default, fully functional
 * implementation; `src/store/postgres.rs` (feature `postgres`) is an
 * adapter over the same contract.
 *
 * Every method returns `CoreResult` so a backend failure surfaces as
 * `CoreError::StorageFailure` to the Coordinator without leaking driver
 * internals; adapters log the underlying cause via `tracing::error!` before
 * converting it.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Comment, ItineraryItem, Participant, Session, VenueOption, Vote};

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for `/health`. The in-memory store is always
    /// reachable; backed stores override this with a real round trip.
    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }

    // Sessions & participants
    async fn insert_session(&self, session: Session) -> anyhow::Result<()>;
    async fn get_session(&self, id: Uuid) -> anyhow::Result<Option<Session>>;
    async fn get_session_by_token(&self, token: &str) -> anyhow::Result<Option<Session>>;
    async fn update_session(&self, session: Session) -> anyhow::Result<()>;
    /// Sessions with `status != Archived` and `updated_at < cutoff`. Each
    /// backend filters however it can — see DESIGN.md's Open Question 1.
    async fn list_sessions_for_archival(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Session>>;

    async fn add_participant(&self, participant: Participant) -> anyhow::Result<()>;
    async fn list_participants(&self, session_id: Uuid) -> anyhow::Result<Vec<Participant>>;

    // Venues & votes
    async fn insert_venue(&self, venue: VenueOption) -> anyhow::Result<()>;
    async fn get_venue(&self, session_id: Uuid, venue_id: Uuid) -> anyhow::Result<Option<VenueOption>>;
    async fn list_venues(&self, session_id: Uuid) -> anyhow::Result<Vec<VenueOption>>;

    async fn get_vote(
        &self,
        venue_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Option<Vote>>;
    async fn upsert_vote(&self, vote: Vote) -> anyhow::Result<()>;
    async fn list_votes_for_venue(&self, venue_id: Uuid) -> anyhow::Result<Vec<Vote>>;

    // Itinerary
    async fn list_itinerary(&self, session_id: Uuid) -> anyhow::Result<Vec<ItineraryItem>>;
    async fn replace_itinerary(&self, session_id: Uuid, items: Vec<ItineraryItem>) -> anyhow::Result<()>;

    // Comments
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()>;
    async fn list_comments_for_venue(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
    ) -> anyhow::Result<Vec<Comment>>;
    async fn list_comments_for_participant(
        &self,
        session_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Vec<Comment>>;
}
