//! Algebraic laws of tag-score vectors.
//!
//! These properties are what the event processor and match scorer rely on:
//! operand order never changes a result, empty vectors are neutral, and
//! normalization yields a unit-sum distribution whenever it is defined.

use proptest::collection::hash_map;
use proptest::prelude::*;
use tagrank_vector::{TagId, TagScoreVector};

const TOLERANCE: f64 = 1e-9;

fn vector() -> impl Strategy<Value = TagScoreVector> {
    hash_map(0u64..32, -100.0f64..100.0, 0..12)
        .prop_map(|scores| scores.into_iter().map(|(t, s)| (TagId(t), s)).collect())
}

fn positive_vector() -> impl Strategy<Value = TagScoreVector> {
    hash_map(0u64..32, 0.001f64..100.0, 1..12)
        .prop_map(|scores| scores.into_iter().map(|(t, s)| (TagId(t), s)).collect())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn add_is_commutative(a in vector(), b in vector()) {
        let ab = a.add(&b);
        let ba = b.add(&a);

        prop_assert_eq!(ab.len(), ba.len());
        for (tag, score) in ab.iter() {
            let other = ba.get(tag).unwrap();
            prop_assert!(close(score, other), "tag {} differs: {} vs {}", tag, score, other);
        }
    }

    #[test]
    fn add_empty_is_identity(a in vector()) {
        prop_assert_eq!(a.add(&TagScoreVector::new()), a);
    }

    #[test]
    fn scale_zero_keeps_support(a in vector()) {
        let scaled = a.scale(0.0);
        prop_assert_eq!(scaled.len(), a.len());
        prop_assert!(scaled.iter().all(|(_, score)| score == 0.0));
    }

    #[test]
    fn intersect_is_symmetric(a in vector(), b in vector()) {
        prop_assert!(close(a.intersect(&b), b.intersect(&a)));
    }

    #[test]
    fn intersect_with_empty_is_zero(a in vector()) {
        prop_assert_eq!(a.intersect(&TagScoreVector::new()), 0.0);
    }

    #[test]
    fn normalized_sums_to_one(a in positive_vector()) {
        let once = a.normalize().unwrap();
        prop_assert!(close(once.sum(), 1.0));

        let twice = once.normalize().unwrap();
        prop_assert!(close(twice.sum(), 1.0));
        for (tag, score) in once.iter() {
            prop_assert!(close(score, twice.get(tag).unwrap()));
        }
    }

    #[test]
    fn sum_ignores_insertion_order(
        pairs in proptest::collection::vec((0u64..32, -1e16f64..1e16), 0..12),
        seed in any::<u64>(),
    ) {
        let forward = TagScoreVector::from_pairs(dedup(&pairs));
        let mut shuffled = dedup(&pairs);
        let len = shuffled.len().max(1);
        shuffled.rotate_left(usize::try_from(seed).unwrap_or(0) % len);
        let rotated = TagScoreVector::from_pairs(shuffled);

        prop_assert_eq!(forward.sum().to_bits(), rotated.sum().to_bits());
        prop_assert_eq!(forward.normalize().is_ok(), rotated.normalize().is_ok());
    }

    #[test]
    fn normalize_or_zero_never_yields_nan(a in vector()) {
        let normalized = a.normalize_or_zero();
        prop_assert!(normalized.iter().all(|(_, score)| score.is_finite()));
    }
}

/// Keep the last score per tag so reordering cannot change which one wins
fn dedup(pairs: &[(u64, f64)]) -> Vec<(u64, f64)> {
    let mut seen = std::collections::BTreeMap::new();
    for &(tag, score) in pairs {
        seen.insert(tag, score);
    }
    seen.into_iter().collect()
}
