//! Concrete scenarios S1-S6 from the core's test plan, exercised against
//! the public `Coordinator` API with the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use planning_core::core::clock::SystemClock;
use planning_core::core::ids::UuidGenerator;
use planning_core::core::model::VoteType;
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

#[tokio::test]
async fn s1_two_participant_vote_and_rank() {
    let coordinator = new_coordinator();

    let session = coordinator
        .create_session("O".to_string(), "Brunch".to_string(), 24)
        .await
        .unwrap();
    let (_, pat) = coordinator
        .join_session(&session.invite_token, "Pat".to_string(), None)
        .await
        .unwrap();

    let v1 = coordinator
        .add_venue(
            session.id,
            "place-1".to_string(),
            "Cafe A".to_string(),
            "1 Main St".to_string(),
            "O".to_string(),
            None,
            None,
            None,
        )
        .await
        .unwrap();
    let v2 = coordinator
        .add_venue(
            session.id,
            "place-2".to_string(),
            "Cafe B".to_string(),
            "2 Main St".to_string(),
            "O".to_string(),
            None,
            None,
            None,
        )
        .await
        .unwrap();

    coordinator
        .cast_vote(session.id, v1.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, v1.id, pat.id.clone(), VoteType::Upvote)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, v2.id, "O".to_string(), VoteType::Downvote)
        .await
        .unwrap();

    let tally_v1 = coordinator.tally(session.id, v1.id).await.unwrap();
    assert_eq!((tally_v1.upvotes, tally_v1.downvotes, tally_v1.net_score()), (2, 0, 2));

    let tally_v2 = coordinator.tally(session.id, v2.id).await.unwrap();
    assert_eq!((tally_v2.upvotes, tally_v2.downvotes, tally_v2.net_score()), (0, 1, -1));

    let ranked = coordinator.rank_venues(session.id).await.unwrap();
    assert_eq!(ranked[0].venue.id, v1.id);
    assert_eq!(ranked[0].rank, 1);
    assert!(!ranked[0].is_tied);
    assert_eq!(ranked[1].venue.id, v2.id);
    assert_eq!(ranked[1].rank, 2);
    assert!(!ranked[1].is_tied);
}

#[tokio::test]
async fn s2_tie_shares_rank() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "Brunch".to_string(), 24)
        .await
        .unwrap();
    let (_, pat) = coordinator
        .join_session(&session.invite_token, "Pat".to_string(), None)
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

    coordinator
        .cast_vote(session.id, v1.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, v2.id, pat.id.clone(), VoteType::Upvote)
        .await
        .unwrap();

    let ranked = coordinator.rank_venues(session.id).await.unwrap();
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|r| r.rank == 1 && r.is_tied));
}

#[tokio::test]
async fn s3_itinerary_chronological_and_contiguous() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "Trip".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    let base = Utc::now();
    let a = coordinator
        .add_to_itinerary(session.id, venue.id, base + Duration::hours(10), "O".to_string())
        .await
        .unwrap();
    assert_eq!(a.len(), 1);

    let venue_b = coordinator
        .add_venue(session.id, "p2".into(), "B".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let b = coordinator
        .add_to_itinerary(session.id, venue_b.id, base + Duration::hours(9), "O".to_string())
        .await
        .unwrap();
    assert_eq!(b.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(b[0].venue_id, venue_b.id);

    let venue_c = coordinator
        .add_venue(session.id, "p3".into(), "C".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();
    let c = coordinator
        .add_to_itinerary(session.id, venue_c.id, base + Duration::hours(11), "O".to_string())
        .await
        .unwrap();
    let ordered_venues: Vec<_> = c.iter().map(|i| i.venue_id).collect();
    assert_eq!(ordered_venues, vec![venue_b.id, venue.id, venue_c.id]);
    assert_eq!(c.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2]);

    let a_item_id = c.iter().find(|i| i.venue_id == venue.id).unwrap().id;
    let after_removal = coordinator.remove_from_itinerary(session.id, a_item_id).await.unwrap();
    let remaining_venues: Vec<_> = after_removal.iter().map(|i| i.venue_id).collect();
    assert_eq!(remaining_venues, vec![venue_b.id, venue_c.id]);
    assert_eq!(after_removal.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1]);
}

#[tokio::test]
async fn s4_vote_change_keeps_single_count() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "Dinner".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Upvote)
        .await
        .unwrap();
    coordinator
        .cast_vote(session.id, venue.id, "O".to_string(), VoteType::Downvote)
        .await
        .unwrap();

    let tally = coordinator.tally(session.id, venue.id).await.unwrap();
    assert_eq!((tally.upvotes, tally.downvotes, tally.total()), (0, 1, 1));
}

#[tokio::test]
async fn s5_revoke_preserves_finalize_freezes() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "Party".to_string(), 24)
        .await
        .unwrap();
    let (_, p1) = coordinator
        .join_session(&session.invite_token, "P1".to_string(), None)
        .await
        .unwrap();
    let (_, _p2) = coordinator
        .join_session(&session.invite_token, "P2".to_string(), None)
        .await
        .unwrap();

    coordinator.revoke_invite(session.id, "O").await.unwrap();

    let rejoin = coordinator
        .join_session(&session.invite_token, "P3".to_string(), None)
        .await;
    assert!(matches!(rejoin, Err(CoreError::Revoked)));

    let participants = coordinator.list_participants(session.id).await.unwrap();
    assert_eq!(participants.len(), 3);

    let summary = coordinator.finalize_session(session.id, "O").await.unwrap();
    assert_eq!(summary.participants.len(), 3);

    let add_after_finalize = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await;
    assert!(matches!(add_after_finalize, Err(CoreError::Finalized)));
    let _ = p1;
}

#[tokio::test]
async fn s6_comment_cap() {
    let coordinator = new_coordinator();
    let session = coordinator
        .create_session("O".to_string(), "Trip".to_string(), 24)
        .await
        .unwrap();
    let venue = coordinator
        .add_venue(session.id, "p1".into(), "A".into(), "addr".into(), "O".into(), None, None, None)
        .await
        .unwrap();

    let exactly_500 = "x".repeat(500);
    coordinator
        .add_comment(session.id, venue.id, "O".to_string(), exactly_500)
        .await
        .unwrap();

    let over_limit = "x".repeat(501);
    let result = coordinator
        .add_comment(session.id, venue.id, "O".to_string(), over_limit)
        .await;
    assert!(matches!(result, Err(CoreError::TooLong { limit: 500 })));

    let comments = coordinator.get_comments(session.id, venue.id).await.unwrap();
    assert_eq!(comments.len(), 1);
}
