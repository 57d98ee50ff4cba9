//! A fixed-block arena that hands out generation-checked slots.
//!
//! Storage is organised in blocks of `block_size` slots each. A block is a
//! `Vec` whose capacity is reserved exactly once and never grown, so its length
//! doubles as the bump pointer and the slots past it are uninitialized storage.
//!
//! Reclaimed slots go onto a LIFO free list and are always reused before the
//! bump pointer advances or a new block is requested. Blocks are only released
//! when the whole arena is dropped.
//!
//! Every slot carries a generation counter that is bumped on deallocation.
//! An `Index` remembers the generation it was issued with, so a stale index
//! is detected instead of aliasing whatever lives in the slot now. It also
//! remembers the arena that issued it, so an index is never honoured by
//! another arena that happens to have a live value at the same slot.

use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::error::{Error, Result};

/// Number of slots per block of a default constructed `Arena`.
pub const BLOCK_SIZE: usize = 4096;

/// Largest number of slots addressable by an `Index`.
pub(crate) const MAX_SLOTS: u64 = u32::MAX as u64 + 1;

static NEXT_STORE_ID: AtomicU32 = AtomicU32::new(0);

/// Returns a fresh tag for a newly created store.
#[inline]
pub(crate) fn next_store_id() -> u32 {
	NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A generation-checked reference to a slot within an `Arena`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Index {
	store     : u32,
	slot      : u32,
	generation: u32
}

impl Index {
	#[inline]
	pub(crate) fn new(store: u32, slot: u32, generation: u32) -> Self {
		Index{
			store     : store,
			slot      : slot,
			generation: generation
		}
	}

	/// Returns the tag of the store that issued this index.
	#[inline]
	pub(crate) fn store(self) -> u32 {
		self.store
	}

	/// Returns the slot position this index refers to.
	#[inline]
	pub fn slot(self) -> usize {
		self.slot as usize
	}

	/// Returns the generation this index was issued with.
	#[inline]
	pub fn generation(self) -> u32 {
		self.generation
	}
}

#[derive(Debug, Clone)]
enum Slot<T> {
	Occupied{ generation: u32, value: T },
	Vacant{ generation: u32 }
}

impl<T> Slot<T> {
	#[inline]
	fn generation(&self) -> u32 {
		match *self {
			Slot::Occupied{ generation, .. } => generation,
			Slot::Vacant{ generation }       => generation
		}
	}
}

/// Block-structured storage for values of type `T`.
///
/// All operations are O(1) except block creation, which happens at most once
/// every `block_size` fresh allocations.
///
/// A clone is a separate arena: indices issued by the original are not valid
/// for the clone and vice versa.
#[derive(Debug)]
pub struct Arena<T> {
	/// Tag stamped into every `Index` this arena hands out.
	id: u32,

	/// Every block has a capacity of exactly `block_size` slots.
	blocks: Vec<Vec<Slot<T>>>,

	/// Slots that were deallocated and wait to be reused, most recent last.
	free: Vec<u32>,

	/// Block that the bump pointer currently advances through.
	cursor: usize,

	/// Number of live values.
	len: usize,

	block_size: usize
}

impl<T> Default for Arena<T> {
	fn default() -> Self {
		Arena::new()
	}
}

impl<T> Arena<T> {
	/// Creates an empty arena using `BLOCK_SIZE` slots per block.
	///
	/// No memory is requested until the first allocation.
	pub fn new() -> Self {
		Arena{
			id        : next_store_id(),
			blocks    : Vec::new(),
			free      : Vec::new(),
			cursor    : 0,
			len       : 0,
			block_size: BLOCK_SIZE
		}
	}

	/// Creates an empty arena using `block_size` slots per block.
	///
	/// Fails with `Error::ZeroBlockSize` if `block_size` is zero.
	pub fn with_block_size(block_size: usize) -> Result<Self> {
		if block_size == 0 {
			return Err(Error::ZeroBlockSize)
		}
		Ok(Arena{
			block_size: block_size,
			.. Arena::new()
		})
	}

	/// Returns the number of live values.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns true if no value is live.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of slots per block.
	#[inline]
	pub fn block_size(&self) -> usize {
		self.block_size
	}

	/// Returns the number of blocks requested so far.
	#[inline]
	pub fn block_count(&self) -> usize {
		self.blocks.len()
	}

	/// Returns the total number of slots over all blocks.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.blocks.len() * self.block_size
	}

	/// Returns the number of reclaimed slots awaiting reuse.
	#[inline]
	pub fn free_len(&self) -> usize {
		self.free.len()
	}

	#[inline]
	fn locate(&self, slot: u32) -> (usize, usize) {
		let slot = slot as usize;
		(slot / self.block_size, slot % self.block_size)
	}

	#[inline]
	fn slot(&self, index: Index) -> Option<&Slot<T>> {
		if index.store != self.id {
			return None
		}
		let (block, offset) = self.locate(index.slot);
		self.blocks.get(block).and_then(|block| block.get(offset))
	}

	#[inline]
	fn slot_mut(&mut self, index: Index) -> Option<&mut Slot<T>> {
		if index.store != self.id {
			return None
		}
		let (block, offset) = self.locate(index.slot);
		self.blocks.get_mut(block).and_then(|block| block.get_mut(offset))
	}

	/// Requests one more block from the global allocator.
	fn expand(&mut self) -> Result<()> {
		let blocks = self.blocks.len() as u64 + 1;
		if blocks * self.block_size as u64 > MAX_SLOTS {
			return Err(Error::AllocationExhausted)
		}
		let mut block = Vec::new();
		block.try_reserve_exact(self.block_size)
			.map_err(|_| Error::AllocationExhausted)?;
		self.blocks.push(block);
		debug!(
			"arena grew to {} blocks ({} slots)", self.blocks.len(), self.capacity());
		Ok(())
	}

	/// Moves `value` into a free slot and returns an index to it.
	///
	/// Reclaimed slots are reused first, most recently freed first.
	/// Otherwise the bump pointer advances, requesting a new block
	/// once all blocks are exhausted.
	///
	/// Fails with `Error::AllocationExhausted` if the index space is used up
	/// or the global allocator refuses another block.
	pub fn allocate(&mut self, value: T) -> Result<Index> {
		if let Some(slot) = self.free.pop() {
			let (block, offset) = self.locate(slot);
			let entry      = &mut self.blocks[block][offset];
			let generation = entry.generation();
			debug_assert!(matches!(*entry, Slot::Vacant{..}), "free list refers to a live slot");
			*entry = Slot::Occupied{ generation: generation, value: value };
			self.len += 1;
			return Ok(Index::new(self.id, slot, generation))
		}

		while self.cursor < self.blocks.len()
			&& self.blocks[self.cursor].len() == self.block_size
		{
			self.cursor += 1;
		}
		if self.cursor == self.blocks.len() {
			self.expand()?;
		}

		let block = &mut self.blocks[self.cursor];
		let slot  = (self.cursor * self.block_size + block.len()) as u32;
		block.push(Slot::Occupied{ generation: 0, value: value });
		self.len += 1;
		Ok(Index::new(self.id, slot, 0))
	}

	/// Takes the value out of the slot referred to by `index` and
	/// pushes the slot onto the free list.
	///
	/// Returns `None` and does nothing if `index` is stale.
	/// Blocks are never shrunk or compacted.
	pub fn deallocate(&mut self, index: Index) -> Option<T> {
		if !self.contains(index) {
			return None
		}
		let (block, offset) = self.locate(index.slot);
		let vacant = Slot::Vacant{ generation: index.generation.wrapping_add(1) };
		match mem::replace(&mut self.blocks[block][offset], vacant) {
			Slot::Occupied{ value, .. } => {
				self.free.push(index.slot);
				self.len -= 1;
				Some(value)
			}
			Slot::Vacant{..} => None
		}
	}

	/// Returns a reference to the value at `index` if it is still live.
	#[inline]
	pub fn get(&self, index: Index) -> Option<&T> {
		match self.slot(index) {
			Some(&Slot::Occupied{ generation, ref value }) if generation == index.generation => Some(value),
			_ => None
		}
	}

	/// Returns a mutable reference to the value at `index` if it is still live.
	#[inline]
	pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
		match self.slot_mut(index) {
			Some(&mut Slot::Occupied{ generation, ref mut value }) if generation == index.generation => Some(value),
			_ => None
		}
	}

	/// Returns true if `index` refers to a live value.
	#[inline]
	pub fn contains(&self, index: Index) -> bool {
		self.get(index).is_some()
	}

	/// Grows the arena block by block until it has room for at least
	/// `capacity` values in total.
	///
	/// This is purely a hint: an arena that was reserved behaves exactly like
	/// one that grew lazily, it just does not stall on the hot path.
	pub fn reserve(&mut self, capacity: usize) -> Result<()> {
		if self.capacity() >= capacity {
			return Ok(())
		}
		debug!("arena reserving room for {} values", capacity);
		while self.capacity() < capacity {
			self.expand()?;
		}
		Ok(())
	}
}

impl<T> Clone for Arena<T>
	where T: Clone
{
	/// Every block of the clone gets the full `block_size` capacity up front,
	/// just like the blocks of the original.
	fn clone(&self) -> Self {
		let blocks = self.blocks.iter()
			.map(|block| {
				let mut copy = Vec::with_capacity(self.block_size);
				copy.extend(block.iter().cloned());
				copy
			})
			.collect();
		Arena{
			id        : next_store_id(),
			blocks    : blocks,
			free      : self.free.clone(),
			cursor    : self.cursor,
			len       : self.len,
			block_size: self.block_size
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn allocate_and_get() {
		let mut arena = Arena::new();
		let a = arena.allocate("a").unwrap();
		let b = arena.allocate("b").unwrap();
		assert_eq!(Some(&"a"), arena.get(a));
		assert_eq!(Some(&"b"), arena.get(b));
		assert_eq!(2, arena.len());
		assert_eq!(1, arena.block_count());
		assert_eq!(BLOCK_SIZE, arena.capacity());
	}

	#[test]
	fn lazy_first_block() {
		let arena = Arena::<u64>::new();
		assert_eq!(0, arena.block_count());
		assert!(arena.is_empty());
	}

	#[test]
	fn deallocate_returns_value() {
		let mut arena = Arena::new();
		let a = arena.allocate(String::from("value")).unwrap();
		assert_eq!(Some(String::from("value")), arena.deallocate(a));
		assert_eq!(0, arena.len());
		assert_eq!(1, arena.free_len());
	}

	#[test]
	fn double_deallocate_is_noop() {
		let mut arena = Arena::new();
		let a = arena.allocate(1).unwrap();
		assert_eq!(Some(1), arena.deallocate(a));
		assert_eq!(None, arena.deallocate(a));
		assert_eq!(1, arena.free_len());
	}

	#[test]
	fn free_list_is_lifo() {
		let mut arena = Arena::new();
		let a = arena.allocate(1).unwrap();
		let b = arena.allocate(2).unwrap();
		arena.deallocate(a);
		arena.deallocate(b);
		let c = arena.allocate(3).unwrap();
		let d = arena.allocate(4).unwrap();
		assert_eq!(b.slot(), c.slot());
		assert_eq!(a.slot(), d.slot());
		assert_eq!(0, arena.free_len());
	}

	#[test]
	fn stale_index_is_rejected() {
		let mut arena = Arena::new();
		let a = arena.allocate(1).unwrap();
		arena.deallocate(a);
		let b = arena.allocate(2).unwrap();
		assert_eq!(a.slot(), b.slot());
		assert_ne!(a.generation(), b.generation());
		assert_eq!(None, arena.get(a));
		assert_eq!(None, arena.get_mut(a));
		assert_eq!(None, arena.deallocate(a));
		assert_eq!(Some(&2), arena.get(b));
	}

	#[test]
	fn grows_block_by_block() {
		let mut arena = Arena::with_block_size(4).unwrap();
		let indices = (0..9).map(|i| arena.allocate(i).unwrap()).collect::<Vec<_>>();
		assert_eq!(3, arena.block_count());
		assert_eq!(12, arena.capacity());
		for (i, &index) in indices.iter().enumerate() {
			assert_eq!(i, index.slot());
			assert_eq!(Some(&i), arena.get(index));
		}
	}

	#[test]
	fn reuse_before_grow() {
		let mut arena = Arena::with_block_size(4).unwrap();
		let mut live = (0..4).map(|i| arena.allocate(i).unwrap()).collect::<Vec<_>>();
		for i in 0..100 {
			let index = live.remove(0);
			arena.deallocate(index);
			live.push(arena.allocate(i).unwrap());
		}
		assert_eq!(1, arena.block_count());
		assert_eq!(4, arena.len());
	}

	#[test]
	fn reserve_preallocates() {
		let mut arena = Arena::<u8>::with_block_size(8).unwrap();
		arena.reserve(17).unwrap();
		assert_eq!(3, arena.block_count());
		arena.reserve(10).unwrap();
		assert_eq!(3, arena.block_count());
		for i in 0..24 {
			arena.allocate(i).unwrap();
		}
		assert_eq!(3, arena.block_count());
		arena.allocate(24).unwrap();
		assert_eq!(4, arena.block_count());
	}

	#[test]
	fn reserved_blocks_are_filled_in_order() {
		let mut arena = Arena::with_block_size(2).unwrap();
		arena.reserve(6).unwrap();
		let slots = (0..6).map(|i| arena.allocate(i).unwrap().slot()).collect::<Vec<_>>();
		assert_eq!(vec![0, 1, 2, 3, 4, 5], slots);
	}

	#[test]
	fn foreign_index_is_rejected() {
		let mut fst = Arena::new();
		let mut snd = Arena::new();
		let a = fst.allocate(1).unwrap();
		let b = snd.allocate(2).unwrap();
		assert_eq!(a.slot(), b.slot());
		assert_eq!(a.generation(), b.generation());
		assert_eq!(None, snd.get(a));
		assert_eq!(None, snd.get_mut(a));
		assert_eq!(None, snd.deallocate(a));
		assert_eq!(Some(&2), snd.get(b));
		assert_eq!(1, snd.len());
	}

	#[test]
	fn clone_keeps_block_capacity() {
		let mut arena = Arena::with_block_size(8).unwrap();
		arena.reserve(16).unwrap();
		let a = arena.allocate(1).unwrap();
		let mut copy = arena.clone();
		assert_eq!(2, copy.block_count());
		assert!(copy.blocks.iter().all(|block| block.capacity() >= 8));

		let before = copy.blocks.iter()
			.map(|block| (block.as_ptr(), block.capacity()))
			.collect::<Vec<_>>();
		for i in 0..15 {
			copy.allocate(i).unwrap();
		}
		let after = copy.blocks.iter()
			.map(|block| (block.as_ptr(), block.capacity()))
			.collect::<Vec<_>>();
		assert_eq!(before, after);
		assert_eq!(16, copy.len());
		assert_eq!(2, copy.block_count());

		// the clone is a separate arena
		assert_eq!(None, copy.get(a));
		assert_eq!(Some(&1), arena.get(a));
		assert_eq!(1, arena.len());
	}

	#[test]
	fn zero_block_size() {
		assert_eq!(
			Err(Error::ZeroBlockSize),
			Arena::<u32>::with_block_size(0).map(|_| ()));
	}
}
