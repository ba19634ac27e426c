//! The nine quantified invariants and three round-trip/idempotence laws.

use std::sync::Arc;

use planning_core::core::clock::SystemClock;
use planning_core::core::ids::UuidGenerator;
use planning_core::core::model::{Comment, ItineraryItem, Session, VoteType};
use planning_core::core::token::CsprngTokenGenerator;
use planning_core::core::{Coordinator, CoreError};
use planning_core::store::InMemoryStore;

fn new_coordinator() -> Coordinator {
    Coordinator::new(
        Arc::new(InMemoryStore::default()),
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
        Arc::new(CsprngTokenGenerator::default()),
        "https://plans.example.com".to_string(),
    )
}

/// 1. invite_token is globally unique with >= 256 bits of entropy.
#[tokio::test]
async fn invite_tokens_are_unique_and_high_entropy() {
    let coordinator = new_coordinator();
    let mut tokens = std::collections::HashSet::new();
    for i in 0..20 {
        let session = coordinator
            .create_session("O".to_string(), format!("Session {i}"), 24)
            .await
            .unwrap();
        assert!(session.invite_token.len() >= 43);
        assert!(tokens.insert(session.invite_token));
    }
}

/// 2. at most one Vote per (venue, participant).
#[tokio::test]
async fn at_most_one_vote_per_venue_and_participant() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    for vote_type in [VoteType::Upvote, VoteType::Downvote, VoteType::Neutral, VoteType::Upvote] {
        coordinator
            .cast_vote(session.id, venue.id, "O".to_string(), vote_type)
            .await
            .unwrap();
    }

    let tally = coordinator.tally(session.id, venue.id).await.unwrap();
    assert_eq!(tally.total(), 1);
}

/// 3. order values form [0, N) and items are sorted by scheduled_time.
#[tokio::test]
async fn itinerary_order_is_a_contiguous_permutation() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();

    let base = chrono::Utc::now();
    let offsets = [5, 1, 3, 2, 4];
    let mut last = vec![];
    for (i, hours) in offsets.iter().enumerate() {
        let venue = coordinator
            .add_venue(session.id, format!("p{i}"), format!("V{i}"), "addr".into(), "O".into(), None, None, None)
            .await
            .unwrap();
        last = coordinator
            .add_to_itinerary(session.id, venue.id, base + chrono::Duration::hours(*hours), "O".to_string())
            .await
            .unwrap();
    }

    assert_orders_contiguous(&last);
    for pair in last.windows(2) {
        assert!(pair[0].scheduled_time <= pair[1].scheduled_time);
    }
}

fn assert_orders_contiguous(items: &[ItineraryItem]) {
    let mut orders: Vec<u32> = items.iter().map(|i| i.order).collect();
    orders.sort_unstable();
    assert_eq!(orders, (0..items.len() as u32).collect::<Vec<_>>());
}

/// 4. comments retrieved via GetComments are monotonically non-decreasing
/// by created_at.
#[tokio::test]
async fn comments_are_chronological() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    for i in 0..5 {
        coordinator
            .add_comment(session.id, venue.id, "O".to_string(), format!("comment {i}"))
            .await
            .unwrap();
    }

    let comments = coordinator.get_comments(session.id, venue.id).await.unwrap();
    for pair in comments.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

/// 5. after FinalizeSession, all mutating operations return Finalized.
#[tokio::test]
async fn finalize_freezes_every_mutation() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    coordinator.finalize_session(session.id, "O").await.unwrap();

    assert!(matches!(
        coordinator
            .add_venue(session.id, "p2".into(), "V2".into(), "addr".into(), "O".into(), None, None, None)
            .await,
        Err(CoreError::Finalized)
    ));
    assert!(matches!(
        coordinator
            .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
            .await,
        Err(CoreError::Finalized)
    ));
    assert!(matches!(
        coordinator
            .add_to_itinerary(session.id, venue.id, chrono::Utc::now(), "O".to_string())
            .await,
        Err(CoreError::Finalized)
    ));
    assert!(matches!(
        coordinator
            .add_comment(session.id, venue.id, "O".to_string(), "hi".to_string())
            .await,
        Err(CoreError::Finalized)
    ));
    assert!(matches!(
        coordinator.join_session(&session.invite_token, "Late".to_string(), None).await,
        Err(CoreError::Finalized)
    ));
}

/// 6. after RevokeInvite, subsequent JoinSession with that token returns
/// Revoked and the participant list is unchanged.
#[tokio::test]
async fn revoke_blocks_future_joins_without_touching_participants() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    coordinator
        .join_session(&session.invite_token, "P1".to_string(), None)
        .await
        .unwrap();
    let before = coordinator.list_participants(session.id).await.unwrap();

    coordinator.revoke_invite(session.id, "O").await.unwrap();

    assert!(matches!(
        coordinator.join_session(&session.invite_token, "P2".to_string(), None).await,
        Err(CoreError::Revoked)
    ));
    let after = coordinator.list_participants(session.id).await.unwrap();
    assert_eq!(before, after);
}

/// 7. Tally.total = up + down + neutral; voters are the distinct
/// participants who voted.
#[tokio::test]
async fn tally_total_matches_vote_counts() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let (_, p1) = coordinator
        .join_session(&session.invite_token, "P1".to_string(), None)
        .await
        .unwrap();

    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, venue.id, p1.id.clone(), VoteType::Neutral)
        .await
        .unwrap();

    let tally = coordinator.tally(session.id, venue.id).await.unwrap();
    assert_eq!(tally.total(), tally.upvotes + tally.downvotes + tally.neutral);
    assert_eq!(tally.total(), 2);

    let mut voters = tally.voters.clone();
    voters.sort();
    let mut expected = vec!["O".to_string(), p1.id];
    expected.sort();
    assert_eq!(voters, expected);
}

/// 8. RankVenues is non-increasing by net_score; is_tied iff rank shared.
#[tokio::test]
async fn rank_venues_is_sorted_and_is_tied_matches_rank_sharing() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let (_, p1) = coordinator
        .join_session(&session.invite_token, "P1".to_string(), None)
        .await
        .unwrap();

    let v1 = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let v2 = coordinator
        .add_venue(session.id, "p2".into(), "B".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let v3 = coordinator
        .add_venue(session.id, "p3".into(), "C".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    coordinator.cast_vote(session.id, v1.id, "O".to_string(), VoteType::Upvote).await.unwrap();
    coordinator.cast_vote(session.id, v1.id, p1.id.clone(), VoteType::Upvote).await.unwrap();
    coordinator.cast_vote(session.id, v2.id, "O".to_string(), VoteType::Upvote).await.unwrap();
    let _ = v3;

    let ranked = coordinator.rank_venues(session.id).await.unwrap();
    for pair in ranked.windows(2) {
        assert!(pair[0].tally.net_score() >= pair[1].tally.net_score());
    }
    for rank in ranked.iter().map(|r| r.rank).collect::<std::collections::HashSet<_>>() {
        let sharers = ranked.iter().filter(|r| r.rank == rank).count();
        for r in ranked.iter().filter(|r| r.rank == rank) {
            assert_eq!(r.is_tied, sharers > 1);
        }
    }
}

/// 9. A reconnecting participant's StateSync reflects a point-in-time
/// composition no older than the connect call.
#[tokio::test]
async fn state_sync_matches_a_fresh_composition() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();

    let mut rx = coordinator.connect(session.id, "O".to_string()).await.unwrap();
    let synced = rx.recv().await.expect("state sync event");

    let composed = coordinator.get_state(session.id).await.unwrap();
    let synced_state: planning_core::core::model::SessionState =
        serde_json::from_value(synced.data).unwrap();
    assert_eq!(synced_state, composed);
}

// ---- Round-trip / idempotence laws -----------------------------------

/// Serializing and deserializing any entity produces an equal entity.
#[test]
fn session_round_trips_through_json() {
    let session = Session {
        id: uuid::Uuid::new_v4(),
        name: "Round trip".to_string(),
        organizer_id: "O".to_string(),
        invite_token: "token".to_string(),
        invite_expires_at: chrono::Utc::now(),
        invite_revoked: false,
        status: planning_core::core::model::SessionStatus::Active,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
        participant_ids: vec!["O".to_string()],
    };
    let json = serde_json::to_string(&session).unwrap();
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(session, back);
}

#[test]
fn comment_round_trips_through_json() {
    let comment = Comment {
        id: uuid::Uuid::new_v4(),
        session_id: uuid::Uuid::new_v4(),
        venue_id: uuid::Uuid::new_v4(),
        participant_id: "O".to_string(),
        text: "looks great".to_string(),
        created_at: chrono::Utc::now(),
    };
    let json = serde_json::to_string(&comment).unwrap();
    let back: Comment = serde_json::from_str(&json).unwrap();
    assert_eq!(comment, back);
}

/// CastVote(p, v, t) twice with the same t is observationally equivalent to
/// once: no tally change on the second call.
#[tokio::test]
async fn recasting_the_same_vote_is_idempotent() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p".into(), "V".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    let first = coordinator.tally(session.id, venue.id).await.unwrap();

    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    let second = coordinator.tally(session.id, venue.id).await.unwrap();

    assert_eq!(first, second);
}

/// AddToItinerary followed by RemoveFromItinerary of the returned item
/// restores the pre-state exactly, including every other item's order.
#[tokio::test]
async fn add_then_remove_restores_prior_itinerary_state() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "S".to_string(), 24)
        .await
        .unwrap();

    let base = chrono::Utc::now();
    let v1 = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let v2 = coordinator
        .add_venue(session.id, "p2".into(), "B".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    coordinator
        .add_to_itinerary(session.id, v1.id, base + chrono::Duration::hours(1), "O".to_string())
        .await
        .unwrap();
    let before = coordinator
        .add_to_itinerary(session.id, v2.id, base + chrono::Duration::hours(2), "O".to_string())
        .await
        .unwrap();

    let v3 = coordinator
        .add_venue(session.id, "p3".into(), "C".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let with_third = coordinator
        .add_to_itinerary(session.id, v3.id, base + chrono::Duration::hours(3), "O".to_string())
        .await
        .unwrap();
    let third_item_id = with_third.iter().find(|i| i.venue_id == v3.id).unwrap().id;

    let after_removal = coordinator.remove_from_itinerary(session.id, third_item_id).await.unwrap();
    assert_eq!(after_removal, before);
}
