//! Global tag popularity
//!
//! Each tag carries one counter, owned by the tag catalog. The counter is
//! incremented by exactly one per tag when a poll using that tag is
//! created, and never decremented. Poll tag profiles read these counters
//! live, so an increment is visible to every later profile read.

use crate::error::{EngineResult, NotFound};
use crate::store::TagCatalog;
use crate::types::PollId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tagrank_vector::TagId;

/// Applies popularity increments for newly created polls
#[derive(Debug, Clone)]
pub struct PopularityTracker {
    catalog: Arc<dyn TagCatalog>,
}

impl PopularityTracker {
    /// Create tracker over the tag catalog
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<dyn TagCatalog>) -> Self {
        Self { catalog }
    }

    /// Increment the popularity of every tag attached to `poll`
    ///
    /// Returns the tags that were bumped, in ascending order.
    ///
    /// # Errors
    /// - `EngineError::NotFound` if the poll is already gone
    /// - `EngineError::Store` from the catalog; increments applied before
    ///   the failure stay applied
    #[tracing::instrument(skip_all, fields(poll = %poll))]
    pub async fn on_poll_created(&self, poll: PollId) -> EngineResult<Vec<TagId>> {
        let tags: BTreeSet<TagId> = self
            .catalog
            .poll_tags(poll)
            .await?
            .ok_or(NotFound::Poll(poll))?
            .into_iter()
            .map(|entry| entry.tag)
            .collect();

        for tag in &tags {
            self.catalog.increment_popularity(*tag).await?;
        }

        tracing::debug!(tags = tags.len(), "tag popularity bumped");
        Ok(tags.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;

    #[tokio::test]
    async fn bumps_each_tag_once() {
        let backend = Arc::new(InMemoryBackend::new());
        let author = backend.add_user();
        let food = backend.tag("food");
        let travel = backend.tag("travel");
        let unused = backend.tag("unused");
        let poll = backend.add_poll(author, "Best street food city?", &[food, travel]);

        let tracker = PopularityTracker::new(backend.clone());
        let bumped = tracker.on_poll_created(poll).await.unwrap();

        assert_eq!(bumped, vec![food, travel]);
        assert_eq!(backend.popularity(food), 1);
        assert_eq!(backend.popularity(travel), 1);
        assert_eq!(backend.popularity(unused), 0);
    }

    #[tokio::test]
    async fn counters_accumulate_across_polls() {
        let backend = Arc::new(InMemoryBackend::new());
        let author = backend.add_user();
        let food = backend.tag("food");
        let tracker = PopularityTracker::new(backend.clone());

        for title in ["a", "b", "c"] {
            let poll = backend.add_poll(author, title, &[food]);
            tracker.on_poll_created(poll).await.unwrap();
        }

        assert_eq!(backend.popularity(food), 3);
    }

    #[tokio::test]
    async fn deleted_poll_bumps_nothing() {
        let backend = Arc::new(InMemoryBackend::new());
        let author = backend.add_user();
        let food = backend.tag("food");
        let poll = backend.add_poll(author, "gone before the event", &[food]);
        backend.delete_poll(poll);

        let err = PopularityTracker::new(backend.clone())
            .on_poll_created(poll)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(backend.popularity(food), 0);
    }

    #[tokio::test]
    async fn untagged_poll_is_noop() {
        let backend = Arc::new(InMemoryBackend::new());
        let author = backend.add_user();
        let poll = backend.add_poll(author, "no tags", &[]);

        let bumped = PopularityTracker::new(backend.clone())
            .on_poll_created(poll)
            .await
            .unwrap();
        assert!(bumped.is_empty());
    }
}
