#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A hash map backed by the dense Robin Hood `HashTable`.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers, plus the
/// `InsertResult` reporting of what an insertion did.
pub mod hash_map;

pub mod hash_table;

/// A hash set backed by the dense Robin Hood `HashTable`.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

pub use allocator_api2::alloc::Allocator;
pub use allocator_api2::alloc::Global;
pub use equivalent::Equivalent;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_map::InsertResult;
pub use hash_map::InsertStatus;
pub use hash_set::HashSet;
pub use hash_set::SetInsertResult;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hash builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder hash builder for builds with neither `std` nor
        /// `foldhash`. It cannot be constructed, so maps and sets need an
        /// explicit hasher.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}

        impl core::hash::BuildHasher for DefaultHashBuilder {
            type Hasher = DefaultHashBuilder;

            fn build_hasher(&self) -> Self::Hasher {
                match *self {}
            }
        }

        impl core::hash::Hasher for DefaultHashBuilder {
            fn finish(&self) -> u64 {
                match *self {}
            }

            fn write(&mut self, _bytes: &[u8]) {
                match *self {}
            }
        }
    }
}
