#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A key-value map built on the separate-chaining `HashTable`.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

pub use hash_map::HashMap;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Default hasher builder for [`HashMap`], based on foldhash.
        ///
        /// Works without `std`; foldhash seeds itself without OS randomness.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else {
        /// Placeholder hasher builder used when the `foldhash` feature is
        /// disabled.
        ///
        /// It cannot be constructed, so maps must be built with an explicit
        /// hasher via [`HashMap::with_hasher`] or
        /// [`HashMap::with_capacity_and_hasher`].
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
