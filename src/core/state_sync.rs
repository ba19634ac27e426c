/**
 * StateSync — spec §4.6.
 *
 * Composes the full-session snapshot delivered to a participant on
 * connect/reconnect. The Coordinator calls this under the per-session lock
 * so the snapshot it captures is never older than the state immediately
 * preceding the `Connect` call, per spec §4.5's ordering guarantee.
 */
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::comments::CommentLog;
use super::error::CoreResult;
use super::itinerary::ItineraryBook;
use super::model::SessionState;
use super::registry::SessionRegistry;
use super::votes::VoteEngine;

pub struct StateSync {
    registry: Arc<SessionRegistry>,
    votes: Arc<VoteEngine>,
    itinerary: Arc<ItineraryBook>,
    comments: Arc<CommentLog>,
}

impl StateSync {
    pub fn new(
        registry: Arc<SessionRegistry>,
        votes: Arc<VoteEngine>,
        itinerary: Arc<ItineraryBook>,
        comments: Arc<CommentLog>,
    ) -> Self {
        Self {
            registry,
            votes,
            itinerary,
            comments,
        }
    }

    pub async fn compose(&self, session_id: Uuid) -> CoreResult<SessionState> {
        let session = self.registry.get_session(session_id).await?;
        let participants = self.registry.list_participants(session_id).await?;
        let venues = self.votes.get_venues(session_id).await?;
        let itinerary = self.itinerary.get_itinerary(session_id).await?;

        let mut tallies = HashMap::with_capacity(venues.len());
        let mut comments = HashMap::with_capacity(venues.len());
        for venue in &venues {
            tallies.insert(venue.id, self.votes.tally(session_id, venue.id).await?);
            comments.insert(venue.id, self.comments.get_comments(session_id, venue.id).await?);
        }

        Ok(SessionState {
            session_id,
            status: session.status,
            participants,
            venues,
            itinerary,
            tallies,
            comments,
        })
    }
}
