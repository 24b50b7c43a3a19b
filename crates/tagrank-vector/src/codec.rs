//! Opaque text-blob codec for persisted vectors
//!
//! Blobs are JSON objects keyed by the decimal tag id, e.g.
//! `{"3":0.5,"12":-0.125}`.

use crate::error::VectorError;
use crate::vector::TagScoreVector;

impl TagScoreVector {
    /// Encode as a persistence blob
    ///
    /// JSON has no NaN or infinity, so such scores are refused rather than
    /// written as `null` and lost on the next lossy read.
    ///
    /// # Errors
    /// - `VectorError::NonFinite` if any score is NaN or infinite
    /// - `VectorError::Encode` if serialization fails
    pub fn to_blob(&self) -> Result<String, VectorError> {
        if let Some((tag, score)) = self.iter().find(|(_, score)| !score.is_finite()) {
            return Err(VectorError::NonFinite { tag, score });
        }
        serde_json::to_string(self).map_err(VectorError::Encode)
    }

    /// Decode a persistence blob strictly
    ///
    /// # Errors
    /// - `VectorError::Decode` if the blob is not a tag-score object
    pub fn from_blob(blob: &str) -> Result<Self, VectorError> {
        serde_json::from_str(blob).map_err(VectorError::Decode)
    }

    /// Decode a possibly-absent blob, falling back to an empty vector
    ///
    /// Absence and corruption both yield the empty vector; corruption is
    /// logged and never surfaced.
    #[must_use]
    pub fn from_blob_lossy(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            return Self::new();
        };

        if blob.trim().is_empty() {
            return Self::new();
        }

        Self::from_blob(blob).unwrap_or_else(|err| {
            tracing::warn!("discarding unreadable affinity blob: {}", err);
            Self::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{TagId, TagScoreVector, VectorError};
    use pretty_assertions::assert_eq;

    #[test]
    fn blob_uses_string_keys() {
        let blob = TagScoreVector::from_pairs([(3, 0.5)]).to_blob().unwrap();
        assert_eq!(blob, r#"{"3":0.5}"#);
    }

    #[test]
    fn non_finite_scores_are_not_encoded() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = TagScoreVector::from_pairs([(1, 0.5), (2, bad)])
                .to_blob()
                .unwrap_err();
            assert!(matches!(err, VectorError::NonFinite { tag, .. } if tag == TagId(2)));
        }
    }

    #[test]
    fn decodes_integer_scores() {
        let decoded = TagScoreVector::from_blob(r#"{"1":2,"2":-0.25}"#).unwrap();
        assert_eq!(decoded.get(TagId(1)), Some(2.0));
        assert_eq!(decoded.get(TagId(2)), Some(-0.25));
    }

    #[test]
    fn strict_decode_rejects_garbage() {
        assert!(TagScoreVector::from_blob("not json").is_err());
        assert!(TagScoreVector::from_blob(r#"{"abc":1}"#).is_err());
        assert!(TagScoreVector::from_blob("[1,2]").is_err());
    }

    #[test]
    fn lossy_decode_falls_back_to_empty() {
        assert!(TagScoreVector::from_blob_lossy(None).is_empty());
        assert!(TagScoreVector::from_blob_lossy(Some("")).is_empty());
        assert!(TagScoreVector::from_blob_lossy(Some("{broken")).is_empty());
        assert!(TagScoreVector::from_blob_lossy(Some(r#"{"1":"high"}"#)).is_empty());
    }

    #[test]
    fn lossy_decode_keeps_valid_blob() {
        let stored = TagScoreVector::from_pairs([(1, 0.5), (2, 1.0)]);
        let blob = stored.to_blob().unwrap();
        assert_eq!(TagScoreVector::from_blob_lossy(Some(&blob)), stored);
    }
}
