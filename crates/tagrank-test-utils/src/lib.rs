//! Testing utilities for the tagrank workspace
//!
//! Shared fixtures, seeded worlds, and float assertions.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;
use tagrank_core::{AffinityEngine, EngineConfig, InMemoryBackend, PollId, UserId};
use tagrank_vector::{TagId, TagScoreVector};

pub const EPSILON: f64 = 1e-9;

/// Engine wired over a fresh in-memory backend
pub struct TestWorld {
    pub backend: Arc<InMemoryBackend>,
    pub engine: AffinityEngine,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_backend(InMemoryBackend::new(), EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_backend(InMemoryBackend::new(), config)
    }

    /// Affinity reads and writes each sleep for `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self::with_backend(InMemoryBackend::new().with_latency(latency), EngineConfig::default())
    }

    pub fn with_backend(backend: InMemoryBackend, config: EngineConfig) -> Self {
        let backend = Arc::new(backend);
        let engine = AffinityEngine::with_backend(config, backend.clone()).unwrap();
        Self { backend, engine }
    }

    pub fn user(&self) -> UserId {
        self.backend.add_user()
    }

    /// Register `name` and force its popularity
    pub fn tag_with_popularity(&self, name: &str, popularity: u64) -> TagId {
        let tag = self.backend.tag(name);
        self.backend.set_popularity(tag, popularity);
        tag
    }

    pub fn poll(&self, author: UserId, title: &str, tags: &[TagId]) -> PollId {
        self.backend.add_poll(author, title, tags)
    }

    /// Persist `vector` as `user`'s affinity, bypassing the event processor
    pub fn set_vector(&self, user: UserId, vector: &TagScoreVector) {
        self.backend
            .put_raw_affinity(user, &vector.to_blob().unwrap());
    }

    pub fn vector(&self, user: UserId) -> TagScoreVector {
        TagScoreVector::from_blob_lossy(self.backend.raw_affinity(user).as_deref())
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

pub fn vector(pairs: &[(TagId, f64)]) -> TagScoreVector {
    pairs.iter().copied().collect()
}

/// Assert two vectors carry the same tags with scores within `EPSILON`
pub fn assert_vector_close(actual: &TagScoreVector, expected: &TagScoreVector) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "tag count differs: {actual:?} vs {expected:?}"
    );
    for (tag, want) in expected.iter() {
        let got = actual
            .get(tag)
            .unwrap_or_else(|| panic!("tag {tag} missing from {actual:?}"));
        assert!(
            (got - want).abs() < EPSILON,
            "tag {tag}: got {got}, want {want}"
        );
    }
}
