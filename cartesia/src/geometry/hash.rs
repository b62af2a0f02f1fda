//! Structural hash codes of geometries.
//!
//! A hash code is seeded with the factory and the geometry kind, then every element (or coordinate)
//! is folded in from left to right as `h' = hash(1_664_525 * h + element)`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::GeometryKind;
use crate::Factory;

const MULTIPLIER: u64 = 1_664_525;

pub(crate) fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

pub(crate) fn seed(factory: &Factory, kind: GeometryKind) -> u64 {
    hash_one(&(factory.hash_code(), kind))
}

pub(crate) fn fold(hash: u64, element: u64) -> u64 {
    hash_one(&hash.wrapping_mul(MULTIPLIER).wrapping_add(element))
}

/// Bits of a coordinate value for hashing. Zeroes of both signs compare equal, so they must hash
/// the same.
pub(crate) fn coord_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zeroes_hash_equal() {
        assert_eq!(coord_bits(0.0), coord_bits(-0.0));
        assert_ne!(coord_bits(1.0), coord_bits(-1.0));
    }

    #[test]
    fn fold_depends_on_order() {
        let a = fold(fold(7, 1), 2);
        let b = fold(fold(7, 2), 1);
        assert_ne!(a, b);
    }
}
