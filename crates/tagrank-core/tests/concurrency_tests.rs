//! Concurrent affinity updates.
//!
//! The backend injects latency between reading and writing a user's blob,
//! so any unserialized read-modify-write would drop updates.

use futures::future::join_all;
use std::time::Duration;
use tagrank_core::{AffinityEvent, EventOutcome};
use tagrank_test_utils::{assert_vector_close, vector, TestWorld};

const LATENCY: Duration = Duration::from_millis(10);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn answered_and_followed_both_land() {
    let world = TestWorld::with_latency(LATENCY);
    let user = world.user();
    let author = world.user();
    let friend = world.user();
    let t1 = world.tag_with_popularity("one", 4);
    let t2 = world.backend.tag("two");
    let poll = world.poll(author, "p", &[t1]);
    world.set_vector(friend, &vector(&[(t2, 8.0)]));

    let answered = {
        let engine = world.engine.clone();
        tokio::spawn(async move { engine.handle(AffinityEvent::PollAnswered { user, poll }).await })
    };
    let followed = {
        let engine = world.engine.clone();
        tokio::spawn(async move {
            engine
                .handle(AffinityEvent::AccountFollowed {
                    user,
                    account: friend,
                })
                .await
        })
    };

    answered.await.unwrap().unwrap();
    followed.await.unwrap().unwrap();

    assert_vector_close(&world.vector(user), &vector(&[(t1, 1.0), (t2, 2.0)]));
    assert_eq!(world.engine.pending_writers(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burst_on_one_user_loses_nothing() {
    let world = TestWorld::with_latency(Duration::from_millis(2));
    let user = world.user();
    let author = world.user();
    let tag = world.tag_with_popularity("burst", 4);
    let poll = world.poll(author, "p", &[tag]);

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let engine = world.engine.clone();
            tokio::spawn(async move { engine.handle(AffinityEvent::PollAnswered { user, poll }).await })
        })
        .collect();

    for outcome in join_all(handles).await {
        assert!(matches!(outcome.unwrap().unwrap(), EventOutcome::Applied { .. }));
    }

    // 40 * 4/4
    assert_vector_close(&world.vector(user), &vector(&[(tag, 40.0)]));
}

#[tokio::test(start_paused = true)]
async fn different_users_update_in_parallel() {
    let world = TestWorld::with_latency(LATENCY);
    let author = world.user();
    let tag = world.tag_with_popularity("parallel", 4);
    let poll = world.poll(author, "p", &[tag]);
    let users: Vec<_> = (0..4).map(|_| world.user()).collect();

    let start = tokio::time::Instant::now();
    join_all(
        users
            .iter()
            .map(|&user| world.engine.handle(AffinityEvent::PollAnswered { user, poll })),
    )
    .await
    .into_iter()
    .for_each(|outcome| {
        outcome.unwrap();
    });

    // one read and one write each, overlapping across users
    let elapsed = start.elapsed();
    assert!(elapsed >= LATENCY * 2, "finished too early: {elapsed:?}");
    assert!(elapsed < LATENCY * 3, "users were serialized: {elapsed:?}");
    for user in users {
        assert_vector_close(&world.vector(user), &vector(&[(tag, 1.0)]));
    }
}

#[tokio::test(start_paused = true)]
async fn same_user_updates_are_serialized() {
    let world = TestWorld::with_latency(LATENCY);
    let user = world.user();
    let author = world.user();
    let tag = world.tag_with_popularity("serial", 4);
    let poll = world.poll(author, "p", &[tag]);

    let start = tokio::time::Instant::now();
    join_all((0..3).map(|_| world.engine.handle(AffinityEvent::PollAnswered { user, poll })))
        .await
        .into_iter()
        .for_each(|outcome| {
            outcome.unwrap();
        });

    let elapsed = start.elapsed();
    assert!(elapsed >= LATENCY * 6, "updates overlapped: {elapsed:?}");
    assert_vector_close(&world.vector(user), &vector(&[(tag, 3.0)]));
}
