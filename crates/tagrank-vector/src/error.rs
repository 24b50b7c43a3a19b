//! Error types for tag-score vectors

use crate::tag::TagId;

/// Errors produced by vector algebra and the blob codec
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    /// Normalization denominator is zero or not finite
    #[error("degenerate vector: scores sum to {sum}")]
    Degenerate {
        /// The offending sum
        sum: f64,
    },

    /// Stored blob could not be decoded
    #[error("invalid affinity blob: {0}")]
    Decode(#[source] serde_json::Error),

    /// Vector could not be encoded
    #[error("failed to encode affinity blob: {0}")]
    Encode(#[source] serde_json::Error),

    /// Score cannot be represented in a blob (NaN or infinite)
    #[error("non-finite score {score} for tag {tag}")]
    NonFinite {
        /// Offending tag
        tag: TagId,
        /// Offending score
        score: f64,
    },
}

impl VectorError {
    /// Check if this is a degenerate-normalization error
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }
}
