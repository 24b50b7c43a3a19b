//! User/poll match scoring
//!
//! `score = normalize(user) · normalize(profile(poll)) - views * view_penalty`
//!
//! A degenerate side (empty, or scores cancelling to zero) normalizes to
//! zeros and contributes nothing, so the score reduces to the view penalty.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{AffinityStore, PollDirectory};
use crate::types::{PollId, UserId};
use futures::TryFutureExt;
use std::sync::Arc;

/// Computes scalar user/poll compatibility
#[derive(Debug, Clone)]
pub struct MatchScorer {
    store: AffinityStore,
    directory: Arc<dyn PollDirectory>,
    view_penalty: f64,
}

impl MatchScorer {
    /// Create scorer
    #[inline]
    #[must_use]
    pub fn new(
        store: AffinityStore,
        directory: Arc<dyn PollDirectory>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            directory,
            view_penalty: config.view_penalty,
        }
    }

    /// Compatibility of `user` with `poll`, lowered by every prior view
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the user or the poll no longer exists
    /// - `EngineError::Store` if a collaborator fails
    pub async fn match_score(&self, user: UserId, poll: PollId) -> EngineResult<f64> {
        let (user_vector, profile, views) = futures::try_join!(
            self.store.user_vector(user),
            self.store.poll_profile(poll),
            self.directory
                .view_count(user, poll)
                .map_err(EngineError::from)
        )?;

        let affinity = user_vector
            .normalize_or_zero()
            .intersect(&profile.normalize_or_zero());
        let score = affinity - f64::from(views) * self.view_penalty;

        tracing::trace!(user = %user, poll = %poll, affinity, views, score, "match scored");
        Ok(score)
    }
}
