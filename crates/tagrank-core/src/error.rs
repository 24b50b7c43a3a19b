//! Error types for the affinity engine
//!
//! Provides error handling for:
//! - Missing candidates, polls, or accounts (`NotFound`)
//! - Opaque collaborator failures (`StoreError`), propagated untouched
//! - Invalid configuration

use crate::types::{PollId, UserId};

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Referenced entity or eligible candidate does not exist
    #[error("not found: {0}")]
    NotFound(#[from] NotFound),

    /// Collaborator failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Check if error is a not-found condition
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// What could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    /// No poll is eligible for recommendation
    #[error("no eligible poll to recommend")]
    NoCandidates,

    /// Poll vanished before it could be resolved
    #[error("poll {0}")]
    Poll(PollId),

    /// Account deleted, or never existed
    #[error("user {0}")]
    User(UserId),
}

/// Collaborator (storage) failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend cannot be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Affinity read or write for an account that does not exist
    #[error("no such user: {0}")]
    MissingUser(UserId),

    /// Any other backend failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Engine result alias
pub type EngineResult<T> = Result<T, EngineError>;
