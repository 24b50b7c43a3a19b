//! Sparse tag-score vector and its algebra
//!
//! Every operation is pure: inputs are borrowed, a fresh vector (or scalar)
//! is returned. Stored vectors are never normalized in place.
//!
//! Scores are kept ordered by tag id so that sums, and therefore the
//! degenerate check in [`TagScoreVector::normalize`], do not depend on
//! insertion order.

use crate::error::VectorError;
use crate::tag::TagId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse mapping from tag to real-valued score
///
/// Scores may be negative and are never clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagScoreVector {
    scores: BTreeMap<TagId, f64>,
}

impl TagScoreVector {
    /// Create empty vector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build vector from raw `(tag, score)` pairs; later duplicates overwrite earlier ones
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        pairs.into_iter().map(|(tag, score)| (TagId(tag), score)).collect()
    }

    /// Score for a tag, if present
    #[inline]
    #[must_use]
    pub fn get(&self, tag: TagId) -> Option<f64> {
        self.scores.get(&tag).copied()
    }

    /// Set score for a tag, returning the previous one
    #[inline]
    pub fn insert(&mut self, tag: TagId, score: f64) -> Option<f64> {
        self.scores.insert(tag, score)
    }

    /// Number of tags carried
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if vector carries no tags
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate `(tag, score)` pairs in ascending tag order
    pub fn iter(&self) -> impl Iterator<Item = (TagId, f64)> + '_ {
        self.scores.iter().map(|(tag, score)| (*tag, *score))
    }

    /// Tags carried by this vector, ascending
    pub fn tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.scores.keys().copied()
    }

    /// Sum of all scores, accumulated in ascending tag order
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.scores.values().sum()
    }

    /// Highest-scoring tags, descending, ties broken by tag id
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<(TagId, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Linear ratio normalization: every score divided by the sum of scores
    ///
    /// This is not an exponential softmax. A negative sum is a valid
    /// denominator and flips the sign of every entry.
    ///
    /// # Errors
    /// - `VectorError::Degenerate` if the sum is exactly zero (including the
    ///   empty vector and cancelling positive/negative scores) or not finite
    #[allow(clippy::float_cmp)]
    pub fn normalize(&self) -> Result<Self, VectorError> {
        let sum = self.sum();
        if sum == 0.0 || !sum.is_finite() {
            return Err(VectorError::Degenerate { sum });
        }

        Ok(self.iter().map(|(tag, score)| (tag, score / sum)).collect())
    }

    /// Normalize, substituting an all-zero vector over the same tags when degenerate
    ///
    /// The substitute contributes nothing to [`intersect`](Self::intersect).
    #[must_use]
    pub fn normalize_or_zero(&self) -> Self {
        match self.normalize() {
            Ok(normalized) => normalized,
            Err(err) => {
                tracing::debug!(tags = self.len(), "normalizing to zero vector: {}", err);
                self.scale(0.0)
            }
        }
    }

    /// Multiply every score by `factor` (which may be negative or zero)
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        self.iter().map(|(tag, score)| (tag, score * factor)).collect()
    }

    /// Union-sum: every tag of either operand, scores summed where both carry it
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (tag, score) in other.iter() {
            *result.scores.entry(tag).or_insert(0.0) += score;
        }
        result
    }

    /// Dot product restricted to tags present in both operands
    #[must_use]
    pub fn intersect(&self, other: &Self) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        small
            .iter()
            .filter_map(|(tag, score)| large.get(tag).map(|theirs| score * theirs))
            .sum()
    }
}

impl FromIterator<(TagId, f64)> for TagScoreVector {
    fn from_iter<I: IntoIterator<Item = (TagId, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

impl Extend<(TagId, f64)> for TagScoreVector {
    fn extend<I: IntoIterator<Item = (TagId, f64)>>(&mut self, iter: I) {
        self.scores.extend(iter);
    }
}
