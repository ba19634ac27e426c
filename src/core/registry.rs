/**
 * SessionRegistry — spec §4.1.
 *
 * Token issuance, invite validation, organizer-only mutations, finalization.
 * Generalizes `session.rs`'s `SessionManager` (CRUD shape) onto the
 * lifecycle semantics of `original_source/.../planning_session_repository.py`
 * and `session_coordinator.py`.
 */
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::clock::Clock;
use super::error::{CoreError, CoreResult};
use super::ids::IdGenerator;
use super::model::{
    Participant, Session, SessionStatus, DISPLAY_NAME_MAX_LEN, SESSION_NAME_MAX_LEN,
};
use super::store::Store;
use super::token::TokenGenerator;

pub const MIN_EXPIRY_HOURS: i64 = 1;
pub const MAX_EXPIRY_HOURS: i64 = 168;

pub struct SessionRegistry {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    tokens: Arc<dyn TokenGenerator>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        tokens: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            tokens,
        }
    }

    pub async fn create_session(
        &self,
        organizer_id: String,
        name: String,
        expiry_hours: i64,
    ) -> CoreResult<Session> {
        let name = name.trim().to_string();
        if name.is_empty() || name.chars().count() > SESSION_NAME_MAX_LEN {
            return Err(CoreError::validation_field(
                format!(
                    "name must be 1..{SESSION_NAME_MAX_LEN} characters, got {}",
                    name.chars().count()
                ),
                "name",
            ));
        }
        if !(MIN_EXPIRY_HOURS..=MAX_EXPIRY_HOURS).contains(&expiry_hours) {
            return Err(CoreError::validation_field(
                format!(
                    "expiry_hours must be {MIN_EXPIRY_HOURS}..={MAX_EXPIRY_HOURS}, got {expiry_hours}"
                ),
                "expiry_hours",
            ));
        }

        let now = self.clock.now();
        let session = Session {
            id: self.ids.next_id(),
            name,
            organizer_id: organizer_id.clone(),
            invite_token: self.unique_token().await?,
            invite_expires_at: now + Duration::hours(expiry_hours),
            invite_revoked: false,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
            participant_ids: vec![organizer_id.clone()],
        };

        self.store
            .insert_session(session.clone())
            .await
            .map_err(log_storage_failure("insert_session"))?;

        let organizer = Participant {
            id: organizer_id,
            session_id: session.id,
            display_name: "Organizer".to_string(),
            joined_at: now,
            is_organizer: true,
        };
        self.store
            .add_participant(organizer)
            .await
            .map_err(log_storage_failure("add_participant"))?;

        tracing::info!(
            session_id = %session.id,
            organizer_id = %session.organizer_id,
            "session created"
        );
        Ok(session)
    }

    /// Tokens must be globally unique; generate until the store reports no
    /// collision (practically never loops more than once at 256 bits).
    async fn unique_token(&self) -> CoreResult<String> {
        for _ in 0..8 {
            let candidate = self.tokens.generate();
            let existing = self
                .store
                .get_session_by_token(&candidate)
                .await
                .map_err(log_storage_failure("get_session_by_token"))?;
            if existing.is_none() {
                return Ok(candidate);
            }
        }
        Err(CoreError::Internal(
            "failed to generate a unique invite token".to_string(),
        ))
    }

    pub async fn get_session(&self, id: Uuid) -> CoreResult<Session> {
        self.store
            .get_session(id)
            .await
            .map_err(log_storage_failure("get_session"))?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub async fn get_session_by_token(&self, token: &str) -> CoreResult<Session> {
        self.store
            .get_session_by_token(token)
            .await
            .map_err(log_storage_failure("get_session_by_token"))?
            .ok_or_else(|| CoreError::NotFound(token.to_string()))
    }

    pub async fn join_session(
        &self,
        token: &str,
        display_name: String,
        participant_id: Option<String>,
    ) -> CoreResult<(Session, Participant)> {
        let mut session = self.get_session_by_token(token).await?;

        let now = self.clock.now();
        if session.invite_revoked {
            return Err(CoreError::Revoked);
        }
        if now > session.invite_expires_at {
            return Err(CoreError::Expired);
        }
        if session.status != SessionStatus::Active {
            return Err(CoreError::Finalized);
        }

        let display_name = display_name.trim().to_string();
        if display_name.is_empty() || display_name.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(CoreError::validation_field(
                format!(
                    "display_name must be 1..{DISPLAY_NAME_MAX_LEN} characters, got {}",
                    display_name.chars().count()
                ),
                "display_name",
            ));
        }

        let participant_id = participant_id.unwrap_or_else(|| self.ids.next_id().to_string());
        if session.participant_ids.contains(&participant_id) {
            return Err(CoreError::Duplicate(participant_id));
        }

        let participant = Participant {
            id: participant_id.clone(),
            session_id: session.id,
            display_name,
            joined_at: now,
            is_organizer: false,
        };
        self.store
            .add_participant(participant.clone())
            .await
            .map_err(log_storage_failure("add_participant"))?;

        session.participant_ids.push(participant_id);
        session.updated_at = now;
        self.store
            .update_session(session.clone())
            .await
            .map_err(log_storage_failure("update_session"))?;

        tracing::info!(
            session_id = %session.id,
            participant_id = %participant.id,
            "participant joined session"
        );
        Ok((session, participant))
    }

    pub async fn list_participants(&self, session_id: Uuid) -> CoreResult<Vec<Participant>> {
        self.store
            .list_participants(session_id)
            .await
            .map_err(log_storage_failure("list_participants"))
    }

    pub async fn revoke_invite(&self, session_id: Uuid, caller_id: &str) -> CoreResult<Session> {
        let mut session = self.get_session(session_id).await?;
        if caller_id != session.organizer_id {
            return Err(CoreError::NotOrganizer);
        }
        session.invite_revoked = true;
        session.updated_at = self.clock.now();
        self.store
            .update_session(session.clone())
            .await
            .map_err(log_storage_failure("update_session"))?;
        tracing::warn!(session_id = %session.id, caller_id = %caller_id, "invite revoked");
        Ok(session)
    }

    /// Transitions the session to `Finalized`. The Coordinator is
    /// responsible for building and returning the `SessionSummary`; this
    /// method only performs the lifecycle transition and guard.
    pub async fn finalize_session(&self, session_id: Uuid, caller_id: &str) -> CoreResult<Session> {
        let mut session = self.get_session(session_id).await?;
        if caller_id != session.organizer_id {
            return Err(CoreError::NotOrganizer);
        }
        if session.status != SessionStatus::Active {
            return Err(CoreError::Finalized);
        }
        session.status = SessionStatus::Finalized;
        session.updated_at = self.clock.now();
        self.store
            .update_session(session.clone())
            .await
            .map_err(log_storage_failure("update_session"))?;
        tracing::info!(session_id = %session.id, caller_id = %caller_id, "session finalized");
        Ok(session)
    }

    /// Archives every session with `updated_at < now - cutoff_age` and
    /// `status != Archived`. Idempotent; returns the count archived.
    pub async fn archive_inactive(&self, cutoff_age: Duration) -> CoreResult<usize> {
        let cutoff: DateTime<Utc> = self.clock.now() - cutoff_age;
        let candidates = self
            .store
            .list_sessions_for_archival(cutoff)
            .await
            .map_err(log_storage_failure("list_sessions_for_archival"))?;

        let now = self.clock.now();
        let mut archived = 0usize;
        for mut session in candidates {
            session.status = SessionStatus::Archived;
            session.updated_at = now;
            self.store
                .update_session(session)
                .await
                .map_err(log_storage_failure("update_session"))?;
            archived += 1;
        }
        if archived > 0 {
            tracing::info!(count = archived, cutoff = %cutoff, "sessions archived");
        }
        Ok(archived)
    }

    /// Lifecycle gate used by the Coordinator: `true` iff mutating
    /// sub-operations (other than RevokeInvite/FinalizeSession) are allowed.
    pub fn require_active(session: &Session) -> CoreResult<()> {
        match session.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Finalized | SessionStatus::Archived => Err(CoreError::Finalized),
        }
    }
}

fn log_storage_failure(op: &'static str) -> impl Fn(anyhow::Error) -> CoreError + '_ {
    move |err| {
        tracing::error!(operation = op, error = %err, "store operation failed");
        CoreError::StorageFailure
    }
}
