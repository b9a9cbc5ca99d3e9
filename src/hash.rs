//! Hashing for the in-memory tick range cache.
//!
//! Cache keys are a handful of integers, so a non-cryptographic hasher
//! is enough. Exactly one of the `rustc-hash` / `ahash` features picks
//! one; any other combination (or `std-hash`) keeps SipHash.

use std::collections::HashMap;

#[cfg(all(
    feature = "rustc-hash",
    not(any(feature = "ahash", feature = "std-hash"))
))]
type BuildFastHasher = rustc_hash::FxBuildHasher;

#[cfg(all(
    feature = "ahash",
    not(any(feature = "rustc-hash", feature = "std-hash"))
))]
type BuildFastHasher = ahash::RandomState;

#[cfg(not(any(
    all(
        feature = "rustc-hash",
        not(any(feature = "ahash", feature = "std-hash"))
    ),
    all(
        feature = "ahash",
        not(any(feature = "rustc-hash", feature = "std-hash"))
    ),
)))]
type BuildFastHasher = std::collections::hash_map::RandomState;

pub type FastMap<K, V> = HashMap<K, V, BuildFastHasher>;

/// Empty map that holds at least `capacity` entries before reallocating.
pub(crate) fn fast_map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, BuildFastHasher::default())
}
