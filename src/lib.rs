#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Error types for fallible sizing.
pub mod error;

/// A key-value map over [`HashTable`].
///
/// This module provides a `HashMap` that hashes keys with a configurable
/// builder and stores `(key, value)` pairs in the underlying table.
pub mod hash_map;

pub mod hash_table;

pub mod primes;

pub use error::TryReserveError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
#[cfg(any(test, feature = "stats"))]
pub use hash_table::DebugStats;
pub use hash_table::DEFAULT_LOAD_FACTOR;
pub use hash_table::HashTable;
#[cfg(any(test, feature = "stats"))]
pub use hash_table::ProbeHistogram;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used by [`HashMap::new`] and friends.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used by [`HashMap::new`] and friends.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder when neither `foldhash` nor `std` is enabled. Maps must
        /// be built with an explicit hasher.
        pub enum DefaultHashBuilder {}
    }
}
