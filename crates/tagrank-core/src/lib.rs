//! Tagrank Core - tag-affinity recommendation engine
//!
//! Maintains a per-user interest vector over content tags and uses it to
//! pick which poll to show a user next:
//! - Applies behavioral events (answered, skipped, looked, followed, created)
//! - Serializes updates per user so concurrent events are never lost
//! - Scores user/poll compatibility with a prior-view penalty
//! - Samples candidates and returns the best-scoring poll
//!
//! Persistence, poll storage, and vote bookkeeping stay behind the
//! collaborator traits in [`store`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tagrank_core::{AffinityEngine, AffinityEvent, EngineConfig, InMemoryBackend};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(InMemoryBackend::new());
//! let engine = AffinityEngine::with_backend(EngineConfig::default(), backend.clone())?;
//!
//! let user = backend.add_user();
//! let author = backend.add_user();
//! let poll = backend.add_poll(author, "Best editor?", &[backend.tag("tools")]);
//!
//! engine.handle(AffinityEvent::PollCreated { poll }).await?;
//! let next = engine.recommend(user).await?;
//! println!("next poll: {}", next.poll.title);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod locks;
pub mod memory;
pub mod popularity;
pub mod scorer;
pub mod selector;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::AffinityEngine;
pub use error::{EngineError, EngineResult, NotFound, StoreError};
pub use events::{AffinityEvent, EventOutcome, EventProcessor, IgnoreReason};
pub use locks::{UserLockGuard, UserLocks};
pub use memory::InMemoryBackend;
pub use popularity::PopularityTracker;
pub use scorer::MatchScorer;
pub use selector::{sample_candidates, select_best, Recommender};
pub use store::{AffinityBackend, AffinityStore, PollDirectory, TagCatalog};
pub use tagrank_vector::{TagId, TagScoreVector};
pub use types::{AnswerId, PollDetail, PollId, RecommendedPoll, TagPopularity, UserId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the affinity engine
    pub use crate::{
        AffinityEngine, AffinityEvent, EngineConfig, EngineError, EventOutcome, PollId,
        RecommendedPoll, TagId, TagScoreVector, UserId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
