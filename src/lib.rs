//! # Probe Set
//!
//! A Rust implementation of an open-addressing hash set with double hashing and lazy
//! (tombstone) deletion.
//!
//! - `OpenAddressingSet`: a single-threaded set storing every key directly in one flat slot
//!   array. Collisions are resolved by stepping through the slots with a second,
//!   key-derived hash; removed keys stay in place as tombstones until the table doubles.
//! - `command`: the `+`/`?`/`-` line protocol that drives a set of byte-string keys.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probeset::{NotFound, OpenAddressingSet, Removed};
//!
//! let mut set = OpenAddressingSet::new();
//!
//! set.insert("apple".to_string()).unwrap();
//! set.insert("banana".to_string()).unwrap();
//! assert!(set.contains("apple"));
//!
//! // A second insert of a live key is rejected
//! assert!(set.insert("apple".to_string()).unwrap_err().is_duplicate());
//!
//! assert_eq!(set.remove("apple"), Ok(Removed));
//! assert_eq!(set.remove("apple"), Err(NotFound));
//! assert!(!set.contains("apple"));
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use probeset::OpenAddressingSet;
//!
//! let mut set = OpenAddressingSet::new();
//! assert_eq!(set.capacity(), 8);
//!
//! // The seventh live key crosses the 3/4 load factor
//! for key in 0..7u32 {
//!     set.insert(key).unwrap();
//! }
//! assert_eq!(set.capacity(), 16);
//! ```

/// Line protocol adapter over a set of byte-string keys
pub mod command;
/// Error types of the set and the command adapter
mod error;
/// Hash derivation and probe sequences
mod hashing;
/// Module implementing the open-addressing set
mod open_set;
/// Slot and entry model
mod slot;

pub use error::{CommandError, DuplicateKey, InsertError, NotFound, ResizeError};
pub use open_set::{Inserted, Iter, OpenAddressingSet, Removed, TableStats};
