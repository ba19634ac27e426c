/**
 * Postgres-backed Store adapter (feature `postgres`, off by default).
 *
 * Mirrors `database/mod.rs`'s pool + migration pattern. Uses runtime
 * `sqlx::query`/`query_as` rather than the compile-time-checked `query!`
 * macro, since this repository has no live database to check queries
 * against at build time.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::core::model::{
    Comment, ItineraryItem, Participant, Session, SessionStatus, VenueOption, Vote, VoteType,
};
use crate::core::store::Store;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

}

fn status_to_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::Finalized => "finalized",
        SessionStatus::Archived => "archived",
    }
}

fn status_from_str(s: &str) -> anyhow::Result<SessionStatus> {
    match s {
        "active" => Ok(SessionStatus::Active),
        "finalized" => Ok(SessionStatus::Finalized),
        "archived" => Ok(SessionStatus::Archived),
        other => Err(anyhow::anyhow!("unknown session status: {other}")),
    }
}

fn vote_type_to_str(vote_type: VoteType) -> &'static str {
    match vote_type {
        VoteType::Upvote => "upvote",
        VoteType::Downvote => "downvote",
        VoteType::Neutral => "neutral",
    }
}

fn vote_type_from_str(s: &str) -> anyhow::Result<VoteType> {
    match s {
        "upvote" => Ok(VoteType::Upvote),
        "downvote" => Ok(VoteType::Downvote),
        "neutral" => Ok(VoteType::Neutral),
        other => Err(anyhow::anyhow!("unknown vote type: {other}")),
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    name: String,
    organizer_id: String,
    invite_token: String,
    invite_expires_at: DateTime<Utc>,
    invite_revoked: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    participant_ids: Vec<String>,
}

impl SessionRow {
    fn into_session(self) -> anyhow::Result<Session> {
        Ok(Session {
            id: self.id,
            name: self.name,
            organizer_id: self.organizer_id,
            invite_token: self.invite_token,
            invite_expires_at: self.invite_expires_at,
            invite_revoked: self.invite_revoked,
            status: status_from_str(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            participant_ids: self.participant_ids,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, name, organizer_id, invite_token, invite_expires_at, \
             invite_revoked, status, created_at, updated_at, participant_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(&session.organizer_id)
        .bind(&session.invite_token)
        .bind(session.invite_expires_at)
        .bind(session.invite_revoked)
        .bind(status_to_str(session.status))
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(&session.participant_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SessionRow::into_session).transpose()
    }

    async fn get_session_by_token(&self, token: &str) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE invite_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SessionRow::into_session).transpose()
    }

    async fn update_session(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE sessions SET name = $2, organizer_id = $3, invite_token = $4, \
             invite_expires_at = $5, invite_revoked = $6, status = $7, updated_at = $8, \
             participant_ids = $9 WHERE id = $1",
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(&session.organizer_id)
        .bind(&session.invite_token)
        .bind(session.invite_expires_at)
        .bind(session.invite_revoked)
        .bind(status_to_str(session.status))
        .bind(session.updated_at)
        .bind(&session.participant_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_sessions_for_archival(
        &self,
        cutoff: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE status != 'archived' AND updated_at < $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SessionRow::into_session).collect()
    }

    async fn add_participant(&self, participant: Participant) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO participants (id, session_id, display_name, joined_at, is_organizer) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&participant.id)
        .bind(participant.session_id)
        .bind(&participant.display_name)
        .bind(participant.joined_at)
        .bind(participant.is_organizer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_participants(&self, session_id: Uuid) -> anyhow::Result<Vec<Participant>> {
        let rows = sqlx::query(
            "SELECT id, session_id, display_name, joined_at, is_organizer FROM participants \
             WHERE session_id = $1 ORDER BY joined_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| Participant {
                id: row.get("id"),
                session_id: row.get("session_id"),
                display_name: row.get("display_name"),
                joined_at: row.get("joined_at"),
                is_organizer: row.get("is_organizer"),
            })
            .collect())
    }

    async fn insert_venue(&self, venue: VenueOption) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO venue_options (id, session_id, place_id, name, address, rating, \
             price_level, photo_url, suggested_at, suggested_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(venue.id)
        .bind(venue.session_id)
        .bind(&venue.place_id)
        .bind(&venue.name)
        .bind(&venue.address)
        .bind(venue.rating)
        .bind(venue.price_level.map(|p| p as i16))
        .bind(&venue.photo_url)
        .bind(venue.suggested_at)
        .bind(&venue.suggested_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_venue(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
    ) -> anyhow::Result<Option<VenueOption>> {
        let row = sqlx::query(
            "SELECT * FROM venue_options WHERE session_id = $1 AND id = $2",
        )
        .bind(session_id)
        .bind(venue_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(venue_from_row))
    }

    async fn list_venues(&self, session_id: Uuid) -> anyhow::Result<Vec<VenueOption>> {
        let rows = sqlx::query("SELECT * FROM venue_options WHERE session_id = $1")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(venue_from_row).collect())
    }

    async fn get_vote(
        &self,
        venue_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Option<Vote>> {
        let row = sqlx::query(
            "SELECT * FROM votes WHERE venue_id = $1 AND participant_id = $2",
        )
        .bind(venue_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(vote_from_row).transpose()
    }

    async fn upsert_vote(&self, vote: Vote) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO votes (id, session_id, venue_id, participant_id, vote_type, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (venue_id, participant_id) \
             DO UPDATE SET vote_type = EXCLUDED.vote_type, updated_at = EXCLUDED.updated_at",
        )
        .bind(vote.id)
        .bind(vote.session_id)
        .bind(vote.venue_id)
        .bind(&vote.participant_id)
        .bind(vote_type_to_str(vote.vote_type))
        .bind(vote.created_at)
        .bind(vote.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_votes_for_venue(&self, venue_id: Uuid) -> anyhow::Result<Vec<Vote>> {
        let rows = sqlx::query("SELECT * FROM votes WHERE venue_id = $1")
            .bind(venue_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(vote_from_row).collect()
    }

    async fn list_itinerary(&self, session_id: Uuid) -> anyhow::Result<Vec<ItineraryItem>> {
        let rows = sqlx::query(
            "SELECT * FROM itinerary_items WHERE session_id = $1 ORDER BY item_order ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(itinerary_item_from_row).collect())
    }

    async fn replace_itinerary(
        &self,
        session_id: Uuid,
        items: Vec<ItineraryItem>,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM itinerary_items WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        for item in items {
            sqlx::query(
                "INSERT INTO itinerary_items (id, session_id, venue_id, scheduled_time, \
                 added_at, added_by, item_order) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(item.id)
            .bind(item.session_id)
            .bind(item.venue_id)
            .bind(item.scheduled_time)
            .bind(item.added_at)
            .bind(&item.added_by)
            .bind(item.order as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, session_id, venue_id, participant_id, text, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(comment.id)
        .bind(comment.session_id)
        .bind(comment.venue_id)
        .bind(&comment.participant_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_comments_for_venue(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
    ) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE session_id = $1 AND venue_id = $2 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .bind(venue_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(comment_from_row).collect())
    }

    async fn list_comments_for_participant(
        &self,
        session_id: Uuid,
        participant_id: &str,
    ) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE session_id = $1 AND participant_id = $2 \
             ORDER BY created_at ASC",
        )
        .bind(session_id)
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(comment_from_row).collect())
    }
}

fn venue_from_row(row: sqlx::postgres::PgRow) -> VenueOption {
    VenueOption {
        id: row.get("id"),
        session_id: row.get("session_id"),
        place_id: row.get("place_id"),
        name: row.get("name"),
        address: row.get("address"),
        rating: row.get("rating"),
        price_level: row.get::<Option<i16>, _>("price_level").map(|p| p as u8),
        photo_url: row.get("photo_url"),
        suggested_at: row.get("suggested_at"),
        suggested_by: row.get("suggested_by"),
    }
}

fn vote_from_row(row: sqlx::postgres::PgRow) -> anyhow::Result<Vote> {
    let vote_type: String = row.get("vote_type");
    Ok(Vote {
        id: row.get("id"),
        session_id: row.get("session_id"),
        venue_id: row.get("venue_id"),
        participant_id: row.get("participant_id"),
        vote_type: vote_type_from_str(&vote_type)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn itinerary_item_from_row(row: sqlx::postgres::PgRow) -> ItineraryItem {
    ItineraryItem {
        id: row.get("id"),
        session_id: row.get("session_id"),
        venue_id: row.get("venue_id"),
        scheduled_time: row.get("scheduled_time"),
        added_at: row.get("added_at"),
        added_by: row.get("added_by"),
        order: row.get::<i32, _>("item_order") as u32,
    }
}

fn comment_from_row(row: sqlx::postgres::PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        session_id: row.get("session_id"),
        venue_id: row.get("venue_id"),
        participant_id: row.get("participant_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}
