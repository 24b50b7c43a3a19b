//! Affinity engine facade
//!
//! Bundles the store, event processor, scorer, and recommender behind one
//! cheaply cloneable handle that request handlers can share.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::{AffinityEvent, EventOutcome, EventProcessor};
use crate::locks::UserLocks;
use crate::popularity::PopularityTracker;
use crate::scorer::MatchScorer;
use crate::selector::Recommender;
use crate::store::{AffinityBackend, AffinityStore, PollDirectory, TagCatalog};
use crate::types::{PollId, RecommendedPoll, UserId};
use std::sync::Arc;
use tagrank_vector::TagScoreVector;

/// The tag-affinity recommendation engine
#[derive(Debug, Clone)]
pub struct AffinityEngine {
    config: EngineConfig,
    store: AffinityStore,
    processor: EventProcessor,
    scorer: MatchScorer,
    recommender: Recommender,
    locks: Arc<UserLocks>,
}

impl AffinityEngine {
    /// Wire an engine over its collaborators
    ///
    /// # Errors
    /// - `EngineError::Config` if `config` fails validation
    pub fn new(
        config: EngineConfig,
        affinities: Arc<dyn AffinityBackend>,
        tags: Arc<dyn TagCatalog>,
        polls: Arc<dyn PollDirectory>,
    ) -> EngineResult<Self> {
        config.validate()?;

        let locks = Arc::new(UserLocks::new());
        let store = AffinityStore::new(affinities, Arc::clone(&tags));
        let processor = EventProcessor::new(
            store.clone(),
            PopularityTracker::new(tags),
            Arc::clone(&locks),
            config.clone(),
        );
        let scorer = MatchScorer::new(store.clone(), Arc::clone(&polls), &config);
        let recommender = Recommender::new(scorer.clone(), polls, &config);

        tracing::debug!(sample_size = config.sample_size, "affinity engine ready");
        Ok(Self {
            config,
            store,
            processor,
            scorer,
            recommender,
            locks,
        })
    }

    /// Wire an engine over one backend implementing every collaborator
    ///
    /// # Errors
    /// - `EngineError::Config` if `config` fails validation
    pub fn with_backend<B>(config: EngineConfig, backend: Arc<B>) -> EngineResult<Self>
    where
        B: AffinityBackend + TagCatalog + PollDirectory + 'static,
    {
        Self::new(config, backend.clone(), backend.clone(), backend)
    }

    /// Apply a behavioral event
    ///
    /// # Errors
    /// - `EngineError::NotFound` if a referenced user or poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    pub async fn handle(&self, event: AffinityEvent) -> EngineResult<EventOutcome> {
        self.processor.handle(event).await
    }

    /// Recommend the next poll for `user`
    ///
    /// # Errors
    /// - `EngineError::NotFound` if nothing is eligible, the user was deleted,
    ///   or a sampled poll vanished
    /// - `EngineError::Store` if a collaborator fails
    pub async fn recommend(&self, user: UserId) -> EngineResult<RecommendedPoll> {
        self.recommender.recommend(user).await
    }

    /// Match score of `user` against `poll`, for diagnostics
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the user or the poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    pub async fn match_score(&self, user: UserId, poll: PollId) -> EngineResult<f64> {
        self.scorer.match_score(user, poll).await
    }

    /// Current affinity vector of `user`
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the account was deleted
    /// - `EngineError::Store` if the backend fails
    pub async fn user_vector(&self, user: UserId) -> EngineResult<TagScoreVector> {
        self.store.user_vector(user).await
    }

    /// Current tag profile of `poll`
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the poll no longer exists
    /// - `EngineError::Store` if the tag catalog fails
    pub async fn poll_profile(&self, poll: PollId) -> EngineResult<TagScoreVector> {
        self.store.poll_profile(poll).await
    }

    /// Event processor
    #[inline]
    #[must_use]
    pub fn processor(&self) -> &EventProcessor {
        &self.processor
    }

    /// Recommender
    #[inline]
    #[must_use]
    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Users with an in-flight affinity update
    #[inline]
    #[must_use]
    pub fn pending_writers(&self) -> usize {
        self.locks.tracked()
    }
}
