//! Fast hash map type alias.
//!
//! The index is keyed by filename, so every insert and lookup hashes a short
//! string. The Fx hash from `rustc-hash` is considerably cheaper than SipHash
//! for those keys and the index never hashes attacker-controlled input over a
//! network boundary.
//!
//! # Examples
//!
//! ```
//! use bs_core::FxHashMap;
//!
//! let mut names: FxHashMap<String, usize> = FxHashMap::default();
//! names.insert("a.txt".to_owned(), 1);
//! assert_eq!(names.get("a.txt"), Some(&1));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Creates an [`FxHashMap`] with room for at least `capacity` keys.
///
/// # Examples
///
/// ```
/// use bs_core::hash::fx_hash_map_with_capacity;
///
/// let map: bs_core::FxHashMap<String, u32> = fx_hash_map_with_capacity(64);
/// assert!(map.capacity() >= 64);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}
