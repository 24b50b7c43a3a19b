//! Tag identifiers

use serde::{Deserialize, Serialize};

/// Identifier of a content tag
///
/// Serialized transparently so that persisted vectors keep the plain
/// `{"<tagId>": score}` object layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u64);

impl TagId {
    /// Create tag id from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TagId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
