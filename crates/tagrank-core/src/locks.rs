//! Per-user write serialization
//!
//! Every read-modify-write of a user's affinity vector runs under that
//! user's async mutex. Locks are keyed by user id, so updates to different
//! users never contend. Idle entries are pruned when their last holder
//! releases them.

use crate::types::UserId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user async mutexes
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user`'s affinity vector
    pub async fn lock(&self, user: UserId) -> UserLockGuard {
        let mutex = self
            .locks
            .entry(user)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        UserLockGuard {
            user,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of users with a live (held or awaited) lock entry
    #[inline]
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one user's affinity vector, released on drop
#[derive(Debug)]
pub struct UserLockGuard {
    user: UserId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLockGuard {
    /// User this guard serializes
    #[inline]
    #[must_use]
    pub fn user(&self) -> UserId {
        self.user
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry still references the mutex: nobody holds or awaits it.
        self.locks
            .remove_if(&self.user, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
