#![deny(unused_imports)]
#![deny(missing_docs)]

//! An addressable pairing heap backed by a fixed-block node arena.
//!
//! Addressable heaps return handles to stored elements that make it possible
//! to edit them later on. The prime example is `decrease_key(h: Handle, k)`
//! which lowers the key of the element associated with the given handle
//! without removing and reinserting it. This is what label-setting shortest
//! path searches like Dijkstra's algorithm need in their inner loop.
//!
//! Heap nodes are kept within an `Arena` that allocates them in large blocks
//! and recycles the slots of removed nodes, so a long run of inserts and
//! removals does not keep asking the global allocator for memory.
//!
//! Handles are generation checked and tied to the store that issued them.
//! Using a handle whose element already left the heap, or a handle of another
//! heap, yields `Error::StaleHandle` instead of touching another element.
//!
//! ```
//! use arena_pairing_heap::PairingHeap;
//!
//! let mut heap = PairingHeap::new();
//! heap.insert(10).unwrap();
//! heap.insert(5).unwrap();
//! let twenty = heap.insert(20).unwrap();
//!
//! assert_eq!(Ok(5), heap.delete_min());
//! heap.decrease_key(twenty, 2).unwrap();
//! assert_eq!(Ok(&2), heap.min());
//! ```
//!
//! It is possible to use custom types as keys as long as they implement `Ord`
//! consistently for as long as they are stored.

pub mod arena;
pub mod store;

mod config;
mod error;
mod heap;

pub use crate::arena::{Arena, Index, BLOCK_SIZE};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::heap::{DrainMin, Handle, Node, PairingHeap, StashPairingHeap};
pub use crate::store::{NodeStore, StashStore};

/// Represents a trait for keys within an addressable pairing heap.
///
/// This trait is implicitly implemented already for all types that are `Ord`.
pub trait Key: Ord {}
impl<T> Key for T where T: Ord {}

/// Type alias for `PairingHeap` that has `i64` as default `Key` type.
pub type DefaultPairingHeap = PairingHeap<i64>;
