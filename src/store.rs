//! Node storage backends for `PairingHeap`.
//!
//! The heap never owns node memory directly, it asks a `NodeStore` for slots
//! and gives them back on removal. The store never looks at heap topology.
//!
//! - `Arena`: fixed-size blocks with a free list. This is the default.
//! - `StashStore`: a single dense vector managed by the `stash` crate.
//!
//! Both stores hand out generation-checked `Index` values tagged with the
//! store that issued them, so a heap behaves identically on top of either of
//! them, including stale and foreign handle detection.

use stash::Stash;

use crate::arena::{next_store_id, Arena, Index, MAX_SLOTS};
use crate::error::{Error, Result};

/// Storage that allocates, looks up and reclaims values by `Index`.
pub trait NodeStore<T>: Default {
	/// Moves `value` into the store and returns an index to it.
	fn allocate(&mut self, value: T) -> Result<Index>;

	/// Takes the value at `index` out of the store.
	///
	/// Returns `None` and does nothing if `index` is stale or was issued by
	/// another store.
	fn deallocate(&mut self, index: Index) -> Option<T>;

	/// Returns a reference to the value at `index` if it is still live.
	fn get(&self, index: Index) -> Option<&T>;

	/// Returns a mutable reference to the value at `index` if it is still live.
	fn get_mut(&mut self, index: Index) -> Option<&mut T>;

	/// Prepares the store to hold at least `capacity` values in total.
	///
	/// Once this returned `Ok`, allocations cannot fail until `len` reaches
	/// `capacity`. Fails with `Error::AllocationExhausted` if that cannot be
	/// guaranteed, without allocating anything.
	fn reserve(&mut self, capacity: usize) -> Result<()>;

	/// Returns the number of live values.
	fn len(&self) -> usize;

	/// Returns true if no value is live.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> NodeStore<T> for Arena<T> {
	#[inline]
	fn allocate(&mut self, value: T) -> Result<Index> {
		Arena::allocate(self, value)
	}

	#[inline]
	fn deallocate(&mut self, index: Index) -> Option<T> {
		Arena::deallocate(self, index)
	}

	#[inline]
	fn get(&self, index: Index) -> Option<&T> {
		Arena::get(self, index)
	}

	#[inline]
	fn get_mut(&mut self, index: Index) -> Option<&mut T> {
		Arena::get_mut(self, index)
	}

	#[inline]
	fn reserve(&mut self, capacity: usize) -> Result<()> {
		Arena::reserve(self, capacity)
	}

	#[inline]
	fn len(&self) -> usize {
		Arena::len(self)
	}
}

/// Node storage on top of a `Stash`.
///
/// The stash reuses vacated slots on its own. Generations are kept in a side
/// table indexed by slot so that stale indices are rejected just like in `Arena`.
#[derive(Debug)]
pub struct StashStore<T> {
	id         : u32,
	values     : Stash<T>,
	generations: Vec<u32>
}

impl<T> Default for StashStore<T> {
	fn default() -> Self {
		StashStore::new()
	}
}

impl<T> StashStore<T> {
	/// Creates an empty store.
	pub fn new() -> Self {
		StashStore{
			id         : next_store_id(),
			values     : Stash::new(),
			generations: Vec::new()
		}
	}

	#[inline]
	fn is_current(&self, index: Index) -> bool {
		index.store() == self.id
			&& self.generations.get(index.slot()) == Some(&index.generation())
	}
}

impl<T> Clone for StashStore<T>
	where T: Clone
{
	fn clone(&self) -> Self {
		StashStore{
			id         : next_store_id(),
			values     : self.values.clone(),
			generations: self.generations.clone()
		}
	}
}

impl<T> NodeStore<T> for StashStore<T> {
	fn allocate(&mut self, value: T) -> Result<Index> {
		let slot = self.values.put(value);
		if slot > u32::MAX as usize {
			self.values.take(slot);
			return Err(Error::AllocationExhausted)
		}
		if slot == self.generations.len() {
			self.generations.push(0);
		}
		Ok(Index::new(self.id, slot as u32, self.generations[slot]))
	}

	fn deallocate(&mut self, index: Index) -> Option<T> {
		if !self.is_current(index) {
			return None
		}
		let value = self.values.take(index.slot())?;
		let generation = &mut self.generations[index.slot()];
		*generation = generation.wrapping_add(1);
		Some(value)
	}

	#[inline]
	fn get(&self, index: Index) -> Option<&T> {
		if self.is_current(index) {
			self.values.get(index.slot())
		}
		else {
			None
		}
	}

	#[inline]
	fn get_mut(&mut self, index: Index) -> Option<&mut T> {
		if self.is_current(index) {
			self.values.get_mut(index.slot())
		}
		else {
			None
		}
	}

	/// The stash fills vacated slots before it appends, so a new slot lies
	/// below `capacity` as long as `len` does.
	fn reserve(&mut self, capacity: usize) -> Result<()> {
		if capacity as u64 > MAX_SLOTS {
			return Err(Error::AllocationExhausted)
		}
		let additional = capacity.saturating_sub(self.generations.len());
		self.generations.try_reserve(additional)
			.map_err(|_| Error::AllocationExhausted)?;
		self.values.reserve(capacity.saturating_sub(self.values.len()));
		Ok(())
	}

	#[inline]
	fn len(&self) -> usize {
		self.values.len()
	}
}
