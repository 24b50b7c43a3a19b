//! Affinity store and outbound collaborator traits
//!
//! The engine never talks to a database directly. It reaches persistence
//! through three object-safe traits:
//! - [`AffinityBackend`]: raw per-user affinity blobs
//! - [`TagCatalog`]: tags attached to a poll and their global popularity
//! - [`PollDirectory`]: candidate queries, poll detail, answers, view counts
//!
//! [`AffinityStore`] layers the vector codec on top of the first two.

use crate::error::{EngineError, EngineResult, NotFound, StoreError};
use crate::types::{AnswerId, PollDetail, PollId, TagPopularity, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tagrank_vector::{TagId, TagScoreVector};

/// Raw storage of per-user affinity blobs
///
/// The blob lives and dies with its account. Both calls fail with
/// [`StoreError::MissingUser`] once the account is gone, so a late event
/// cannot resurrect a deleted user's vector.
#[async_trait]
pub trait AffinityBackend: Send + Sync + std::fmt::Debug {
    /// Fetch the stored blob, `None` if the user has none yet
    async fn load_affinity(&self, user: UserId) -> Result<Option<String>, StoreError>;

    /// Replace the stored blob
    async fn store_affinity(&self, user: UserId, blob: String) -> Result<(), StoreError>;
}

/// Tags and their global popularity counters
#[async_trait]
pub trait TagCatalog: Send + Sync + std::fmt::Debug {
    /// Tags currently attached to `poll`, with their current popularity
    ///
    /// `None` if the poll does not exist; an untagged poll yields `Some(vec![])`.
    async fn poll_tags(&self, poll: PollId) -> Result<Option<Vec<TagPopularity>>, StoreError>;

    /// Atomically add one to the tag's popularity counter
    async fn increment_popularity(&self, tag: TagId) -> Result<(), StoreError>;
}

/// Poll repository queries used by recommendation
#[async_trait]
pub trait PollDirectory: Send + Sync + std::fmt::Debug {
    /// Up to `limit` polls neither authored nor voted on by `user`
    async fn candidate_polls(&self, user: UserId, limit: usize)
        -> Result<Vec<PollId>, StoreError>;

    /// Full poll detail, `None` if the poll no longer exists
    async fn poll_detail(&self, poll: PollId) -> Result<Option<PollDetail>, StoreError>;

    /// Answers `user` already selected on `poll`
    async fn user_answers(&self, user: UserId, poll: PollId)
        -> Result<Vec<AnswerId>, StoreError>;

    /// Times `poll` was already shown to `user`
    async fn view_count(&self, user: UserId, poll: PollId) -> Result<u32, StoreError>;
}

/// Typed access to user affinity vectors and poll tag profiles
#[derive(Debug, Clone)]
pub struct AffinityStore {
    affinities: Arc<dyn AffinityBackend>,
    tags: Arc<dyn TagCatalog>,
}

impl AffinityStore {
    /// Create store over the given collaborators
    #[inline]
    #[must_use]
    pub fn new(affinities: Arc<dyn AffinityBackend>, tags: Arc<dyn TagCatalog>) -> Self {
        Self { affinities, tags }
    }

    /// Load a user's affinity vector
    ///
    /// Missing or unreadable blobs yield the empty vector.
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the account no longer exists
    /// - `EngineError::Store` if the backend itself fails
    pub async fn user_vector(&self, user: UserId) -> EngineResult<TagScoreVector> {
        let blob = self
            .affinities
            .load_affinity(user)
            .await
            .map_err(lift_missing)?;
        Ok(TagScoreVector::from_blob_lossy(blob.as_deref()))
    }

    /// Persist a user's affinity vector, replacing the previous one
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the account no longer exists
    /// - `EngineError::Store` if encoding or the backend write fails
    pub async fn set_user_vector(&self, user: UserId, vector: &TagScoreVector) -> EngineResult<()> {
        let blob = vector
            .to_blob()
            .map_err(|e| StoreError::Other(anyhow::Error::new(e)))?;
        self.affinities
            .store_affinity(user, blob)
            .await
            .map_err(lift_missing)
    }

    /// Build a poll's tag profile from current global popularity
    ///
    /// The profile is recomputed on every call and tracks current tag
    /// salience, not salience at poll creation.
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the poll no longer exists
    /// - `EngineError::Store` if the tag catalog fails
    pub async fn poll_profile(&self, poll: PollId) -> EngineResult<TagScoreVector> {
        let tags = self
            .tags
            .poll_tags(poll)
            .await?
            .ok_or(NotFound::Poll(poll))?;
        #[allow(clippy::cast_precision_loss)]
        let profile = tags
            .into_iter()
            .map(|entry| (entry.tag, entry.popularity as f64))
            .collect();
        Ok(profile)
    }
}

/// Deleted accounts surface as `NotFound`, every other failure stays opaque
fn lift_missing(err: StoreError) -> EngineError {
    match err {
        StoreError::MissingUser(user) => NotFound::User(user).into(),
        other => other.into(),
    }
}
