//! Poll recommendation
//!
//! # Workflow
//! 1. Ask the poll directory for eligible candidates (not authored, not voted)
//! 2. Shuffle uniformly and keep the first `sample_size`
//! 3. Score each sampled candidate
//! 4. Keep the first strictly-greatest score (earlier candidates win ties)
//! 5. Re-fetch the winner's detail and the user's answers on it

use crate::config::EngineConfig;
use crate::error::{EngineResult, NotFound};
use crate::scorer::MatchScorer;
use crate::store::PollDirectory;
use crate::types::{PollId, RecommendedPoll, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Picks the next poll to show a user
#[derive(Debug, Clone)]
pub struct Recommender {
    scorer: MatchScorer,
    directory: Arc<dyn PollDirectory>,
    sample_size: usize,
    candidate_limit: usize,
}

impl Recommender {
    /// Create recommender
    #[inline]
    #[must_use]
    pub fn new(
        scorer: MatchScorer,
        directory: Arc<dyn PollDirectory>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            scorer,
            directory,
            sample_size: config.sample_size,
            candidate_limit: config.candidate_limit,
        }
    }

    /// Recommend a poll to `user`
    ///
    /// # Errors
    /// - `EngineError::NotFound` if no poll is eligible, the user was
    ///   deleted, or a sampled poll disappeared before it was resolved
    /// - `EngineError::Store` if a collaborator fails
    #[tracing::instrument(skip_all, fields(user = %user))]
    pub async fn recommend(&self, user: UserId) -> EngineResult<RecommendedPoll> {
        let candidates = self
            .directory
            .candidate_polls(user, self.candidate_limit)
            .await?;
        if candidates.is_empty() {
            tracing::debug!("no eligible candidates");
            return Err(NotFound::NoCandidates.into());
        }

        let sampled = sample_candidates(candidates, self.sample_size, &mut rand::rng());
        self.recommend_from(user, &sampled).await
    }

    /// Score an already-sampled candidate list in order and resolve the winner
    ///
    /// # Errors
    /// - `EngineError::NotFound` if `sampled` is empty or any sampled poll vanished
    /// - `EngineError::Store` if a collaborator fails
    pub async fn recommend_from(
        &self,
        user: UserId,
        sampled: &[PollId],
    ) -> EngineResult<RecommendedPoll> {
        let scores = futures::future::try_join_all(
            sampled.iter().map(|poll| self.scorer.match_score(user, *poll)),
        )
        .await?;

        let (index, score) = select_best(&scores).ok_or(NotFound::NoCandidates)?;
        let winner = sampled[index];

        let poll = self
            .directory
            .poll_detail(winner)
            .await?
            .ok_or(NotFound::Poll(winner))?;
        let answered = self.directory.user_answers(user, winner).await?;

        tracing::info!(poll = %winner, score, sampled = sampled.len(), "poll recommended");
        Ok(RecommendedPoll { poll, answered })
    }
}

/// Uniformly shuffle `candidates` and keep at most `n`
pub fn sample_candidates<R: Rng + ?Sized>(
    mut candidates: Vec<PollId>,
    n: usize,
    rng: &mut R,
) -> Vec<PollId> {
    candidates.shuffle(rng);
    candidates.truncate(n);
    candidates
}

/// Index and value of the first strictly-greatest score
///
/// Later scores replace the current best only when strictly greater, so
/// the earliest of equal maxima wins. NaN never wins over a number.
#[must_use]
pub fn select_best(scores: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        let replace = match best {
            None => true,
            Some((_, current)) => score > current || (current.is_nan() && !score.is_nan()),
        };
        if replace {
            best = Some((index, score));
        }
    }
    best
}
