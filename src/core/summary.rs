/**
 * SummaryBuilder — spec §4.6.
 *
 * Composes the sealed `SessionSummary` from the participant list and a
 * caller-supplied itinerary snapshot. Never reads the Store itself — the
 * Coordinator hands it exactly the data the summary is a function of, so
 * the build step has no I/O and no locking concerns of its own.
 */
use uuid::Uuid;

use super::model::{Participant, Session, SessionSummary};
use super::model::ItineraryItem;

pub struct SummaryBuilder {
    invite_base_url: String,
}

impl SummaryBuilder {
    pub fn new(invite_base_url: String) -> Self {
        Self { invite_base_url }
    }

    pub fn build(
        &self,
        session: &Session,
        participants: Vec<Participant>,
        itinerary: Vec<ItineraryItem>,
    ) -> SessionSummary {
        SessionSummary {
            session_id: session.id,
            session_name: session.name.clone(),
            finalized_at: session.updated_at,
            participants,
            itinerary,
            share_url: self.share_url(session.id),
        }
    }

    /// Deterministic template: `{invite_base_url}/sessions/{session_id}/summary`.
    fn share_url(&self, session_id: Uuid) -> String {
        format!(
            "{}/sessions/{session_id}/summary",
            self.invite_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SessionStatus;
    use chrono::Utc;

    #[test]
    fn share_url_is_deterministic_and_trims_trailing_slash() {
        let builder = SummaryBuilder::new("https://plans.example.com/".to_string());
        let session = Session {
            id: Uuid::new_v4(),
            name: "Friday dinner".to_string(),
            organizer_id: "p1".to_string(),
            invite_token: "tok".to_string(),
            invite_expires_at: Utc::now(),
            invite_revoked: false,
            status: SessionStatus::Finalized,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            participant_ids: vec!["p1".to_string()],
        };
        let summary = builder.build(&session, vec![], vec![]);
        assert_eq!(
            summary.share_url,
            format!("https://plans.example.com/sessions/{}/summary", session.id)
        );
    }
}
