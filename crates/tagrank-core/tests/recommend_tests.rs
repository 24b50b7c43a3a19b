//! Recommendation selection over the in-memory poll directory.

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use tagrank_core::{EngineConfig, EngineError, NotFound, PollId};
use tagrank_test_utils::{vector, TestWorld};

#[tokio::test]
async fn empty_candidate_set_is_not_found() {
    let world = TestWorld::new();
    let user = world.user();
    world.poll(user, "only my own poll", &[]);

    let err = world.engine.recommend(user).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(NotFound::NoCandidates)));
}

#[tokio::test]
async fn fully_voted_directory_is_not_found() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let poll = world.poll(author, "voted already", &[]);
    let answer = world.backend.poll(poll).unwrap().answer_ids[0];
    world.backend.record_vote(user, poll, answer);

    assert!(world.engine.recommend(user).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn first_of_equal_maxima_wins() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let tag = world.tag_with_popularity("shared", 1);
    world.set_vector(user, &vector(&[(tag, 1.0)]));

    // identical affinity (1.0) everywhere; views shape scores as [3, 5, 5, 1, 2]
    let views = [2, 0, 0, 4, 3];
    let mut sampled = Vec::new();
    for (i, count) in views.iter().enumerate() {
        let poll = world.poll(author, &format!("candidate {i}"), &[tag]);
        world.backend.set_views(user, poll, *count);
        sampled.push(poll);
    }

    let picked = world
        .engine
        .recommender()
        .recommend_from(user, &sampled)
        .await
        .unwrap();
    assert_eq!(picked.poll.id, sampled[1]);
}

#[tokio::test]
async fn best_affinity_wins_without_views() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let sport = world.tag_with_popularity("sport", 5);
    let art = world.tag_with_popularity("art", 5);
    world.set_vector(user, &vector(&[(sport, 3.0), (art, 1.0)]));

    let art_poll = world.poll(author, "Monet?", &[art]);
    let sport_poll = world.poll(author, "Offside rule?", &[sport]);

    // only two candidates: both always sampled
    let picked = world.engine.recommend(user).await.unwrap();
    assert_eq!(picked.poll.id, sport_poll);
    assert_ne!(picked.poll.id, art_poll);
    assert!(picked.answered.is_empty());
}

#[tokio::test]
async fn viewed_poll_loses_exactly_thirty() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let tag = world.tag_with_popularity("news", 7);
    world.set_vector(user, &vector(&[(tag, 2.0)]));
    let fresh = world.poll(author, "fresh", &[tag]);
    let stale = world.poll(author, "stale", &[tag]);
    world.backend.set_views(user, stale, 3);

    let fresh_score = world.engine.match_score(user, fresh).await.unwrap();
    let stale_score = world.engine.match_score(user, stale).await.unwrap();
    assert_eq!(fresh_score - stale_score, 30.0);
}

#[tokio::test]
async fn vanished_winner_is_not_found() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let poll = world.poll(author, "soon deleted", &[]);
    world.backend.delete_poll(poll);

    let err = world
        .engine
        .recommender()
        .recommend_from(user, &[poll])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(NotFound::Poll(id)) if id == poll));
}

#[tokio::test]
async fn empty_sample_is_not_found() {
    let world = TestWorld::new();
    let user = world.user();

    let err = world
        .engine
        .recommender()
        .recommend_from(user, &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn answered_list_mirrors_existing_votes() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let poll = world.poll(author, "already answered", &[]);
    let answer = world.backend.poll(poll).unwrap().answer_ids[1];
    world.backend.record_vote(user, poll, answer);

    let picked = world
        .engine
        .recommender()
        .recommend_from(user, &[poll])
        .await
        .unwrap();
    assert_eq!(picked.answered, vec![answer]);
}

#[tokio::test]
async fn recommendations_stay_eligible() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    let own = world.poll(user, "mine", &[]);
    let voted = world.poll(author, "voted", &[]);
    let answer = world.backend.poll(voted).unwrap().answer_ids[0];
    world.backend.record_vote(user, voted, answer);

    let eligible: HashSet<PollId> = (0..8)
        .map(|i| world.poll(author, &format!("open {i}"), &[]))
        .collect();

    for _ in 0..50 {
        let picked = world.engine.recommend(user).await.unwrap().poll.id;
        assert!(eligible.contains(&picked));
        assert_ne!(picked, own);
        assert_ne!(picked, voted);
    }
}

#[tokio::test]
async fn sampling_window_limits_scored_candidates() {
    // window of one: with all-zero scores the random pick must cover the pool
    let world = TestWorld::with_config(EngineConfig::new().with_sample_size(1));
    let user = world.user();
    let author = world.user();
    let pool: HashSet<PollId> = (0..4)
        .map(|i| world.poll(author, &format!("p{i}"), &[]))
        .collect();

    let mut seen = HashSet::new();
    for _ in 0..200 {
        seen.insert(world.engine.recommend(user).await.unwrap().poll.id);
    }
    assert_eq!(seen, pool);
}

#[tokio::test]
async fn store_outage_propagates_opaquely() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    world.poll(author, "p", &[]);
    world.backend.set_unavailable(true);

    let err = world.engine.recommend(user).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
}

#[tokio::test]
async fn scoring_missing_poll_is_not_found() {
    let world = TestWorld::new();
    let user = world.user();

    let err = world
        .engine
        .match_score(user, PollId(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(NotFound::Poll(PollId(9999)))));
}

#[tokio::test]
async fn deleted_user_gets_no_recommendation() {
    let world = TestWorld::new();
    let user = world.user();
    let author = world.user();
    world.poll(author, "still open", &[]);
    world.backend.delete_user(user);

    let err = world.engine.recommend(user).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(NotFound::User(u)) if u == user));
}
