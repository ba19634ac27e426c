/**
 * VoteEngine — spec §4.2.
 *
 * Venue catalog, idempotent per-participant votes, ranked tallies with tie
 * detection. Ranking algorithm matches
 * `original_source/.../vote_manager.py::get_ranked_venues` exactly:
 * competition ranking — sort by net score descending, a venue's rank only
 * advances to its 1-based sorted index when its score differs from its
 * predecessor's.
 */
use std::sync::Arc;

use uuid::Uuid;

use super::clock::Clock;
use super::error::{CoreError, CoreResult};
use super::ids::IdGenerator;
use super::model::{RankedVenue, Tally, VenueOption, Vote, VoteType};
use super::store::Store;

pub struct VoteEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl VoteEngine {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, clock, ids }
    }

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
        if place_id.trim().is_empty() {
            return Err(CoreError::validation_field("place_id must not be empty", "place_id"));
        }
        if let Some(r) = rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(CoreError::validation_field("rating must be in 0..=5", "rating"));
            }
        }
        if let Some(p) = price_level {
            if p > 4 {
                return Err(CoreError::validation_field(
                    "price_level must be in 0..=4",
                    "price_level",
                ));
            }
        }

        let venue = VenueOption {
            id: self.ids.next_id(),
            session_id,
            place_id,
            name,
            address,
            rating,
            price_level,
            photo_url,
            suggested_at: self.clock.now(),
            suggested_by,
        };
        self.store
            .insert_venue(venue.clone())
            .await
            .map_err(log_storage_failure("insert_venue"))?;
        Ok(venue)
    }

    pub async fn get_venues(&self, session_id: Uuid) -> CoreResult<Vec<VenueOption>> {
        self.store
            .list_venues(session_id)
            .await
            .map_err(log_storage_failure("list_venues"))
    }

    async fn require_venue(&self, session_id: Uuid, venue_id: Uuid) -> CoreResult<VenueOption> {
        self.store
            .get_venue(session_id, venue_id)
            .await
            .map_err(log_storage_failure("get_venue"))?
            .ok_or_else(|| CoreError::VenueNotFound(venue_id.to_string()))
    }

    pub async fn cast_vote(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        participant_id: String,
        vote_type: VoteType,
    ) -> CoreResult<(Vote, Tally)> {
        self.require_venue(session_id, venue_id).await?;

        let now = self.clock.now();
        let existing = self
            .store
            .get_vote(venue_id, &participant_id)
            .await
            .map_err(log_storage_failure("get_vote"))?;

        let vote = match existing {
            Some(mut vote) => {
                vote.vote_type = vote_type;
                vote.updated_at = now;
                vote
            }
            None => Vote {
                id: self.ids.next_id(),
                session_id,
                venue_id,
                participant_id,
                vote_type,
                created_at: now,
                updated_at: now,
            },
        };

        self.store
            .upsert_vote(vote.clone())
            .await
            .map_err(log_storage_failure("upsert_vote"))?;

        let tally = self.tally(session_id, venue_id).await?;
        Ok((vote, tally))
    }

    pub async fn tally(&self, _session_id: Uuid, venue_id: Uuid) -> CoreResult<Tally> {
        let votes = self
            .store
            .list_votes_for_venue(venue_id)
            .await
            .map_err(log_storage_failure("list_votes_for_venue"))?;

        let mut tally = Tally::default();
        for vote in &votes {
            match vote.vote_type {
                VoteType::Upvote => tally.upvotes += 1,
                VoteType::Downvote => tally.downvotes += 1,
                VoteType::Neutral => tally.neutral += 1,
            }
            tally.voters.push(vote.participant_id.clone());
        }
        Ok(tally)
    }

    pub async fn rank_venues(&self, session_id: Uuid) -> CoreResult<Vec<RankedVenue>> {
        let venues = self.get_venues(session_id).await?;
        if venues.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored = Vec::with_capacity(venues.len());
        for venue in venues {
            let tally = self.tally(session_id, venue.id).await?;
            scored.push((venue, tally));
        }
        scored.sort_by(|a, b| b.1.net_score().cmp(&a.1.net_score()));

        // competition ranking: rank advances to 1-based index only when the
        // score changes from the previous venue.
        let mut rank_by_index = vec![0u32; scored.len()];
        let mut current_rank = 1u32;
        let mut prev_score: Option<i64> = None;
        for (i, (_, tally)) in scored.iter().enumerate() {
            let score = tally.net_score();
            if prev_score != Some(score) {
                current_rank = (i + 1) as u32;
            }
            rank_by_index[i] = current_rank;
            prev_score = Some(score);
        }

        let mut rank_counts = std::collections::HashMap::new();
        for rank in &rank_by_index {
            *rank_counts.entry(*rank).or_insert(0u32) += 1;
        }

        Ok(scored
            .into_iter()
            .zip(rank_by_index)
            .map(|((venue, tally), rank)| RankedVenue {
                venue,
                tally,
                rank,
                is_tied: rank_counts[&rank] > 1,
            })
            .collect())
    }
}

fn log_storage_failure(op: &'static str) -> impl Fn(anyhow::Error) -> CoreError + '_ {
    move |err| {
        tracing::error!(operation = op, error = %err, "store operation failed");
        CoreError::StorageFailure
    }
}
