//! Tagrank Vector
//!
//! Sparse tag-score vectors and the algebra the recommendation engine is
//! built from.
//!
//! # Overview
//!
//! - [`TagId`]: integer identifier of a content tag
//! - [`TagScoreVector`]: sparse `TagId -> f64` mapping (user affinity or poll profile)
//! - Algebra: [`TagScoreVector::normalize`], [`TagScoreVector::scale`],
//!   [`TagScoreVector::add`], [`TagScoreVector::intersect`]
//! - Codec: opaque text blobs for persistence ([`TagScoreVector::to_blob`],
//!   [`TagScoreVector::from_blob_lossy`])
//!
//! # Example
//!
//! ```rust
//! use tagrank_vector::TagScoreVector;
//!
//! let user = TagScoreVector::from_pairs([(1, 1.0), (2, 3.0)]);
//! let poll = TagScoreVector::from_pairs([(2, 2.0), (7, 2.0)]);
//!
//! let score = user.normalize_or_zero().intersect(&poll.normalize_or_zero());
//! assert!((score - 0.375).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod codec;
pub mod error;
pub mod tag;
pub mod vector;

// Re-exports
pub use error::VectorError;
pub use tag::TagId;
pub use vector::TagScoreVector;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for vector algebra
    pub use crate::{TagId, TagScoreVector, VectorError};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
