//! Hash collections used by the engine.
//!
//! `hashbrown` keyed by `ahash` by default; the `std-hash` feature swaps in
//! `std::collections` for hosts that want to avoid the extra crates.

#[cfg(feature = "std-hash")]
pub mod map {
    pub type HashMap<K, V> = std::collections::HashMap<K, V>;
    pub type HashSet<K> = std::collections::HashSet<K>;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
    pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
}

#[cfg(feature = "std-hash")]
#[inline]
pub(crate) fn hasher() -> std::collections::hash_map::DefaultHasher {
    std::collections::hash_map::DefaultHasher::new()
}

#[cfg(not(feature = "std-hash"))]
#[inline]
pub(crate) fn hasher() -> ahash::AHasher {
    ahash::AHasher::default()
}

/// Builds an empty map with capacity for `len` entries.
#[inline]
pub fn map_with_capacity<K, V>(len: usize) -> map::HashMap<K, V> {
    map::HashMap::with_capacity_and_hasher(len, Default::default())
}
