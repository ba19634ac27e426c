/**
 * Core data model
 *
 * Entities owned by a planning session. Children hold their parent's id only
 * (session_id, venue_id) rather than direct references — see DESIGN.md for
 * why this is an id-based arena rather than a reference graph.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Finalized,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub organizer_id: String,
    pub invite_token: String,
    pub invite_expires_at: DateTime<Utc>,
    pub invite_revoked: bool,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub participant_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: String,
    pub session_id: Uuid,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub is_organizer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueOption {
    pub id: Uuid,
    pub session_id: Uuid,
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f32>,
    pub price_level: Option<u8>,
    pub photo_url: Option<String>,
    pub suggested_at: DateTime<Utc>,
    pub suggested_by: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Upvote,
    Downvote,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub id: Uuid,
    pub session_id: Uuid,
    pub venue_id: Uuid,
    pub participant_id: String,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Tally {
    pub upvotes: u32,
    pub downvotes: u32,
    pub neutral: u32,
    /// Distinct participants who cast a vote on this venue.
    pub voters: Vec<String>,
}

impl Tally {
    pub fn net_score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    pub fn total(&self) -> u32 {
        self.upvotes + self.downvotes + self.neutral
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedVenue {
    pub venue: VenueOption,
    pub tally: Tally,
    pub rank: u32,
    pub is_tied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryItem {
    pub id: Uuid,
    pub session_id: Uuid,
    pub venue_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub session_id: Uuid,
    pub venue_id: Uuid,
    pub participant_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

pub const COMMENT_MAX_LEN: usize = 500;
pub const SESSION_NAME_MAX_LEN: usize = 200;
pub const DISPLAY_NAME_MAX_LEN: usize = 50;

/// Sealed, immutable snapshot produced once on finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub session_name: String,
    pub finalized_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    pub itinerary: Vec<ItineraryItem>,
    pub share_url: String,
}

/// Full-session snapshot delivered to a participant on connect/reconnect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub participants: Vec<Participant>,
    pub venues: Vec<VenueOption>,
    pub itinerary: Vec<ItineraryItem>,
    pub tallies: std::collections::HashMap<Uuid, Tally>,
    pub comments: std::collections::HashMap<Uuid, Vec<Comment>>,
}
