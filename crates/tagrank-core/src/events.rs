//! Behavioral event processing
//!
//! Each handler computes a delta from the vector algebra and adds it to the
//! acting user's affinity vector:
//!
//! | Event            | Delta                                          |
//! |------------------|------------------------------------------------|
//! | poll answered    | `profile(poll) * answered_factor`              |
//! | poll skipped     | `(vector(author) + profile(poll)) * skipped_factor` |
//! | account looked   | `vector(account) * looked_factor`              |
//! | account followed | `vector(account) * followed_factor`            |
//!
//! Poll creation does not touch any user vector; it bumps tag popularity.
//!
//! The read-add-write of the acting user's vector runs under that user's
//! lock. Counterpart vectors are read without locking.
//!
//! A user or poll deleted before its event is handled fails the event with
//! `NotFound`; nothing is written for a deleted account.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::locks::UserLocks;
use crate::popularity::PopularityTracker;
use crate::store::AffinityStore;
use crate::types::{PollId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tagrank_vector::{TagId, TagScoreVector};

/// Domain event that may update affinity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AffinityEvent {
    /// `user` voted on `poll`
    PollAnswered {
        /// Acting user
        user: UserId,
        /// Answered poll
        poll: PollId,
    },
    /// `user` skipped `poll`, written by `author`
    PollSkipped {
        /// Acting user
        user: UserId,
        /// Skipped poll
        poll: PollId,
        /// Poll author
        author: UserId,
    },
    /// `user` opened `account`'s profile from `poll`
    AccountLooked {
        /// Acting user
        user: UserId,
        /// Poll the profile was reached from
        poll: PollId,
        /// Viewed account
        account: UserId,
    },
    /// `user` followed `account`
    AccountFollowed {
        /// Acting user
        user: UserId,
        /// Followed account
        account: UserId,
    },
    /// `poll` was just created with its tags attached
    PollCreated {
        /// New poll
        poll: PollId,
    },
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// User vector updated and persisted
    Applied {
        /// Updated user
        user: UserId,
        /// Number of tags the delta touched
        touched_tags: usize,
    },
    /// Precondition failed; nothing changed
    Ignored(IgnoreReason),
    /// Tag popularity counters incremented
    PopularityBumped {
        /// Bumped tags, ascending
        tags: Vec<TagId>,
    },
}

/// Why an event was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// User skipped their own poll
    OwnPoll,
    /// User looked at or followed their own account
    OwnAccount,
}

/// Applies behavioral events to affinity vectors
#[derive(Debug, Clone)]
pub struct EventProcessor {
    store: AffinityStore,
    popularity: PopularityTracker,
    locks: Arc<UserLocks>,
    config: EngineConfig,
}

impl EventProcessor {
    /// Create processor
    #[inline]
    #[must_use]
    pub fn new(
        store: AffinityStore,
        popularity: PopularityTracker,
        locks: Arc<UserLocks>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            popularity,
            locks,
            config,
        }
    }

    /// Dispatch an event to its handler
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    pub async fn handle(&self, event: AffinityEvent) -> EngineResult<EventOutcome> {
        match event {
            AffinityEvent::PollAnswered { user, poll } => self.on_poll_answered(user, poll).await,
            AffinityEvent::PollSkipped { user, poll, author } => {
                self.on_poll_skipped(user, poll, author).await
            }
            AffinityEvent::AccountLooked {
                user,
                poll,
                account,
            } => self.on_account_looked(user, poll, account).await,
            AffinityEvent::AccountFollowed { user, account } => {
                self.on_account_followed(user, account).await
            }
            AffinityEvent::PollCreated { poll } => self.on_poll_created(poll).await,
        }
    }

    /// User answered a poll: pull toward the poll's tag profile
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    #[tracing::instrument(skip_all, fields(user = %user, poll = %poll))]
    pub async fn on_poll_answered(&self, user: UserId, poll: PollId) -> EngineResult<EventOutcome> {
        let profile = self.store.poll_profile(poll).await?;
        let delta = profile.scale(self.config.answered_factor);
        self.apply(user, &delta).await
    }

    /// User skipped a poll: push away from the poll and its author's interests
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    #[tracing::instrument(skip_all, fields(user = %user, poll = %poll, author = %author))]
    pub async fn on_poll_skipped(
        &self,
        user: UserId,
        poll: PollId,
        author: UserId,
    ) -> EngineResult<EventOutcome> {
        if user == author {
            tracing::debug!("skip of own poll ignored");
            return Ok(EventOutcome::Ignored(IgnoreReason::OwnPoll));
        }

        let (author_vector, profile) = futures::try_join!(
            self.store.user_vector(author),
            self.store.poll_profile(poll)
        )?;
        let delta = author_vector
            .add(&profile)
            .scale(self.config.skipped_factor);
        self.apply(user, &delta).await
    }

    /// User opened another account's profile
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    #[tracing::instrument(skip_all, fields(user = %user, poll = %poll, account = %account))]
    pub async fn on_account_looked(
        &self,
        user: UserId,
        poll: PollId,
        account: UserId,
    ) -> EngineResult<EventOutcome> {
        if user == account {
            tracing::debug!("look at own account ignored");
            return Ok(EventOutcome::Ignored(IgnoreReason::OwnAccount));
        }

        let delta = self
            .store
            .user_vector(account)
            .await?
            .scale(self.config.looked_factor);
        self.apply(user, &delta).await
    }

    /// User followed another account
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    #[tracing::instrument(skip_all, fields(user = %user, account = %account))]
    pub async fn on_account_followed(
        &self,
        user: UserId,
        account: UserId,
    ) -> EngineResult<EventOutcome> {
        if user == account {
            tracing::debug!("follow of own account ignored");
            return Ok(EventOutcome::Ignored(IgnoreReason::OwnAccount));
        }

        let delta = self
            .store
            .user_vector(account)
            .await?
            .scale(self.config.followed_factor);
        self.apply(user, &delta).await
    }

    /// Poll created: bump global popularity of its tags
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the poll no longer exists
    /// - `EngineError::Store` if the tag catalog fails
    pub async fn on_poll_created(&self, poll: PollId) -> EngineResult<EventOutcome> {
        let tags = self.popularity.on_poll_created(poll).await?;
        Ok(EventOutcome::PopularityBumped { tags })
    }

    /// Add `delta` to the user's stored vector under the user's lock
    async fn apply(&self, user: UserId, delta: &TagScoreVector) -> EngineResult<EventOutcome> {
        let _guard = self.locks.lock(user).await;

        let current = self.store.user_vector(user).await?;
        let updated = current.add(delta);
        self.store.set_user_vector(user, &updated).await?;

        tracing::info!(tags = delta.len(), "affinity updated");
        Ok(EventOutcome::Applied {
            user,
            touched_tags: delta.len(),
        })
    }
}
