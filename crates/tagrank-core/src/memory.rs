//! In-memory collaborators
//!
//! [`InMemoryBackend`] implements every outbound trait over process memory:
//! users, polls with answers and tags, a tag-name registry with
//! create-or-get semantics, votes, view counts, and raw affinity blobs.
//! Affinity calls for accounts never registered, or already deleted, fail
//! with `StoreError::MissingUser`.
//! It backs the simulator and the test suites.
//!
//! Artificial latency can be injected on affinity reads and writes to
//! widen the window in which concurrent updates would race.

use crate::error::StoreError;
use crate::store::{AffinityBackend, PollDirectory, TagCatalog};
use crate::types::{AnswerId, PollDetail, PollId, TagPopularity, UserId};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tagrank_vector::TagId;

/// Answers attached to polls created through [`InMemoryBackend::add_poll`]
const DEFAULT_ANSWERS: usize = 2;

#[derive(Debug, Default)]
struct World {
    polls: BTreeMap<PollId, PollDetail>,
    tag_names: HashMap<String, TagId>,
    popularity: HashMap<TagId, u64>,
    votes: HashMap<(UserId, PollId), Vec<AnswerId>>,
    views: HashMap<(UserId, PollId), u32>,
}

/// Process-local implementation of all engine collaborators
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    world: Mutex<World>,
    users: DashSet<UserId>,
    affinities: DashMap<UserId, String>,
    next_user: AtomicU64,
    next_poll: AtomicU64,
    next_tag: AtomicU64,
    next_answer: AtomicU64,
    latency: Option<Duration>,
    unavailable: AtomicBool,
}

impl InMemoryBackend {
    /// Create empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every affinity read and write by `latency`
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every collaborator call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Register a new account
    pub fn add_user(&self) -> UserId {
        let user = UserId(self.next_user.fetch_add(1, Ordering::SeqCst) + 1);
        self.users.insert(user);
        user
    }

    /// Delete an account together with its affinity blob
    pub fn delete_user(&self, user: UserId) {
        self.users.remove(&user);
        self.affinities.remove(&user);
    }

    /// Check if the account exists
    #[must_use]
    pub fn has_user(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }

    /// Tag id for `name`, registering it with zero popularity if new
    pub fn tag(&self, name: &str) -> TagId {
        let mut world = self.world.lock();
        if let Some(tag) = world.tag_names.get(name) {
            return *tag;
        }

        let tag = TagId(self.next_tag.fetch_add(1, Ordering::SeqCst) + 1);
        world.tag_names.insert(name.to_string(), tag);
        world.popularity.insert(tag, 0);
        tag
    }

    /// Current popularity of `tag` (zero if unknown)
    #[must_use]
    pub fn popularity(&self, tag: TagId) -> u64 {
        self.world.lock().popularity.get(&tag).copied().unwrap_or(0)
    }

    /// Overwrite the popularity of `tag`
    pub fn set_popularity(&self, tag: TagId, popularity: u64) {
        self.world.lock().popularity.insert(tag, popularity);
    }

    /// Store a poll with two answers and the given tags
    ///
    /// Does not touch tag popularity; that is the poll-created handler's job.
    pub fn add_poll(&self, author: UserId, title: &str, tags: &[TagId]) -> PollId {
        let id = PollId(self.next_poll.fetch_add(1, Ordering::SeqCst) + 1);
        let answer_ids = (0..DEFAULT_ANSWERS)
            .map(|_| AnswerId(self.next_answer.fetch_add(1, Ordering::SeqCst) + 1))
            .collect();

        let detail = PollDetail {
            id,
            title: title.to_string(),
            description: String::new(),
            kind: "single".to_string(),
            author_id: author,
            answer_ids,
            tag_ids: tags.to_vec(),
        };

        self.world.lock().polls.insert(id, detail);
        id
    }

    /// Remove a poll with its votes and views
    pub fn delete_poll(&self, poll: PollId) {
        let mut world = self.world.lock();
        world.polls.remove(&poll);
        world.votes.retain(|(_, p), _| *p != poll);
        world.views.retain(|(_, p), _| *p != poll);
    }

    /// Stored poll detail
    #[must_use]
    pub fn poll(&self, poll: PollId) -> Option<PollDetail> {
        self.world.lock().polls.get(&poll).cloned()
    }

    /// Record that `user` selected `answer` on `poll`
    pub fn record_vote(&self, user: UserId, poll: PollId, answer: AnswerId) {
        self.world
            .lock()
            .votes
            .entry((user, poll))
            .or_default()
            .push(answer);
    }

    /// Record one more showing of `poll` to `user`
    pub fn record_view(&self, user: UserId, poll: PollId) {
        *self.world.lock().views.entry((user, poll)).or_insert(0) += 1;
    }

    /// Overwrite the view count of `poll` for `user`
    pub fn set_views(&self, user: UserId, poll: PollId, views: u32) {
        self.world.lock().views.insert((user, poll), views);
    }

    /// Store a raw affinity blob verbatim
    pub fn put_raw_affinity(&self, user: UserId, blob: &str) {
        self.affinities.insert(user, blob.to_string());
    }

    /// Raw affinity blob as stored
    #[must_use]
    pub fn raw_affinity(&self, user: UserId) -> Option<String> {
        self.affinities.get(&user).map(|blob| blob.clone())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory backend switched off"));
        }
        Ok(())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl AffinityBackend for InMemoryBackend {
    async fn load_affinity(&self, user: UserId) -> Result<Option<String>, StoreError> {
        self.delay().await;
        self.check_available()?;
        if !self.has_user(user) {
            return Err(StoreError::MissingUser(user));
        }
        Ok(self.raw_affinity(user))
    }

    async fn store_affinity(&self, user: UserId, blob: String) -> Result<(), StoreError> {
        self.delay().await;
        self.check_available()?;
        // the account row guards its blob for the whole write
        let Some(_account) = self.users.get(&user) else {
            return Err(StoreError::MissingUser(user));
        };
        self.affinities.insert(user, blob);
        Ok(())
    }
}

#[async_trait]
impl TagCatalog for InMemoryBackend {
    async fn poll_tags(&self, poll: PollId) -> Result<Option<Vec<TagPopularity>>, StoreError> {
        self.check_available()?;
        let world = self.world.lock();
        let Some(detail) = world.polls.get(&poll) else {
            return Ok(None);
        };

        let unique: HashSet<TagId> = detail.tag_ids.iter().copied().collect();
        Ok(Some(
            unique
                .into_iter()
                .map(|tag| {
                    TagPopularity::new(tag, world.popularity.get(&tag).copied().unwrap_or(0))
                })
                .collect(),
        ))
    }

    async fn increment_popularity(&self, tag: TagId) -> Result<(), StoreError> {
        self.check_available()?;
        *self.world.lock().popularity.entry(tag).or_insert(0) += 1;
        Ok(())
    }
}

#[async_trait]
impl PollDirectory for InMemoryBackend {
    async fn candidate_polls(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<PollId>, StoreError> {
        self.check_available()?;
        let world = self.world.lock();
        Ok(world
            .polls
            .values()
            .filter(|poll| poll.author_id != user)
            .filter(|poll| !world.votes.contains_key(&(user, poll.id)))
            .map(|poll| poll.id)
            .take(limit)
            .collect())
    }

    async fn poll_detail(&self, poll: PollId) -> Result<Option<PollDetail>, StoreError> {
        self.check_available()?;
        Ok(self.poll(poll))
    }

    async fn user_answers(
        &self,
        user: UserId,
        poll: PollId,
    ) -> Result<Vec<AnswerId>, StoreError> {
        self.check_available()?;
        Ok(self
            .world
            .lock()
            .votes
            .get(&(user, poll))
            .cloned()
            .unwrap_or_default())
    }

    async fn view_count(&self, user: UserId, poll: PollId) -> Result<u32, StoreError> {
        self.check_available()?;
        Ok(self
            .world
            .lock()
            .views
            .get(&(user, poll))
            .copied()
            .unwrap_or(0))
    }
}
