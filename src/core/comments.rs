/**
 * CommentLog — spec §4.4.
 *
 * Append-only per-venue comment threads, 1..=500 chars, with a secondary
 * per-participant index for "my comments across this session" lookups.
 */
use std::sync::Arc;

use uuid::Uuid;

use super::clock::Clock;
use super::error::{CoreError, CoreResult};
use super::ids::IdGenerator;
use super::model::{Comment, COMMENT_MAX_LEN};
use super::store::Store;

pub struct CommentLog {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl CommentLog {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, clock, ids }
    }

    pub async fn add_comment(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        participant_id: String,
        text: String,
    ) -> CoreResult<Comment> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CoreError::validation_field(
                "comment text must not be empty",
                "text",
            ));
        }
        if text.chars().count() > COMMENT_MAX_LEN {
            return Err(CoreError::TooLong {
                limit: COMMENT_MAX_LEN,
            });
        }

        let comment = Comment {
            id: self.ids.next_id(),
            session_id,
            venue_id,
            participant_id,
            text,
            created_at: self.clock.now(),
        };
        self.store
            .insert_comment(comment.clone())
            .await
            .map_err(log_storage_failure("insert_comment"))?;
        Ok(comment)
    }

    pub async fn get_comments(&self, session_id: Uuid, venue_id: Uuid) -> CoreResult<Vec<Comment>> {
        self.store
            .list_comments_for_venue(session_id, venue_id)
            .await
            .map_err(log_storage_failure("list_comments_for_venue"))
    }

    pub async fn get_participant_comments(
        &self,
        session_id: Uuid,
        participant_id: &str,
    ) -> CoreResult<Vec<Comment>> {
        self.store
            .list_comments_for_participant(session_id, participant_id)
            .await
            .map_err(log_storage_failure("list_comments_for_participant"))
    }
}

fn log_storage_failure(op: &'static str) -> impl Fn(anyhow::Error) -> CoreError + '_ {
    move |err| {
        tracing::error!(operation = op, error = %err, "store operation failed");
        CoreError::StorageFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FakeClock;
    use crate::core::ids::SequenceIdGenerator;
    use crate::store::memory::InMemoryStore;

    fn log() -> CommentLog {
        CommentLog::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(FakeClock::new(chrono::Utc::now())),
            Arc::new(SequenceIdGenerator::new(vec![Uuid::new_v4()])),
        )
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_text() {
        let log = log();
        let session_id = Uuid::new_v4();
        let venue_id = Uuid::new_v4();

        let empty = log
            .add_comment(session_id, venue_id, "p1".to_string(), "   ".to_string())
            .await;
        assert!(matches!(empty, Err(CoreError::Validation { .. })));

        let oversized = "x".repeat(COMMENT_MAX_LEN + 1);
        let too_long = log
            .add_comment(session_id, venue_id, "p1".to_string(), oversized)
            .await;
        assert!(matches!(too_long, Err(CoreError::TooLong { limit }) if limit == COMMENT_MAX_LEN));
    }
}
