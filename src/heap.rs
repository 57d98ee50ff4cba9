//! The pairing heap itself.
//!
//! The heap is a single multiway tree kept in first-child/next-sibling form.
//! Nodes live in a `NodeStore` and refer to each other by `Index`. Besides its
//! first child and next sibling every node remembers where it hangs, either
//! below its parent as the leftmost child or to the right of a sibling. This
//! makes cutting a node out for `decrease_key` an O(1) operation.

use std::marker::PhantomData;
use std::mem;

use itertools::Itertools;
use log::trace;
use unreachable::UncheckedOptionExt;

use crate::arena::{Arena, Index};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{NodeStore, StashStore};
use crate::Key;

/// A handle to access stored elements within an addressable pairing heap.
///
/// Handles are local to the heap that issued them and turn stale as soon as
/// their element leaves the heap. Stale handles, and handles that were issued
/// by another heap, are rejected with `Error::StaleHandle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Handle(Index);

impl Handle {
	/// Returns the storage index behind this handle.
	#[inline]
	pub fn index(self) -> Index {
		self.0
	}
}

/// Where a node is attached within the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Prev {
	/// The root, or a tree that is being rearranged.
	Detached,

	/// Leftmost child of the given parent.
	Parent(Index),

	/// Right neighbour of the given sibling.
	Left(Index)
}

/// A heap node as it is kept in the node store.
#[derive(Debug, Clone)]
pub struct Node<T> {
	key    : T,
	child  : Option<Index>,
	sibling: Option<Index>,
	prev   : Prev
}

impl<T> Node<T> {
	#[inline]
	fn singleton(key: T) -> Self {
		Node{
			key    : key,
			child  : None,
			sibling: None,
			prev   : Prev::Detached
		}
	}

	#[inline]
	fn is_root(&self) -> bool {
		self.prev == Prev::Detached && self.sibling.is_none()
	}
}

/// Type alias for `PairingHeap` that stores its nodes within a `Stash`.
pub type StashPairingHeap<T> = PairingHeap<T, StashStore<Node<T>>>;

/// An addressable pairing heap implementation.
///
/// Stores keys of type `T`, smallest first. Inserting a key returns a `Handle`
/// that can later be used to lower that key with `decrease_key`.
///
/// Node memory is obtained from and returned to the store `S`, which is a
/// block based `Arena` unless specified otherwise.
///
/// The ordering of `T` must stay consistent for as long as a key is stored.
/// Keys are only ever changed through `decrease_key`.
#[derive(Debug, Clone)]
pub struct PairingHeap<T, S = Arena<Node<T>>>
	where T: Key,
	      S: NodeStore<Node<T>>
{
	/// The tree holding the minimum key, or `None` if the heap is empty.
	root: Option<Index>,
	len : usize,

	/// Owns the memory of every node reachable from `root`.
	store: S,

	/// Scratch buffers for the two-pass consolidation of `delete_min`.
	forest: Vec<Index>,
	pairs : Vec<Index>,

	marker: PhantomData<T>
}

impl<T> PairingHeap<T>
	where T: Key
{
	/// Creates a new, empty `PairingHeap` backed by an `Arena`.
	#[inline]
	pub fn new() -> Self {
		PairingHeap::with_store(Arena::new())
	}

	/// Creates a new, empty `PairingHeap` from the given configuration.
	///
	/// Fails with `Error::ZeroBlockSize` for a zero block size and with
	/// `Error::AllocationExhausted` if the reserve cannot be satisfied.
	pub fn with_config(config: Config) -> Result<Self> {
		let mut heap = PairingHeap::with_store(Arena::with_block_size(config.block_size)?);
		heap.reserve(config.reserve)?;
		Ok(heap)
	}
}

impl<T, S> Default for PairingHeap<T, S>
	where T: Key,
	      S: NodeStore<Node<T>>
{
	fn default() -> Self {
		PairingHeap::with_store(S::default())
	}
}

impl<T, S> PairingHeap<T, S>
	where T: Key,
	      S: NodeStore<Node<T>>
{
	#[inline]
	fn with_store(store: S) -> Self {
		debug_assert!(store.is_empty());
		PairingHeap{
			root  : None,
			len   : 0,
			store : store,
			forest: Vec::new(),
			pairs : Vec::new(),
			marker: PhantomData
		}
	}

	/// Returns the number of elements stored in this `PairingHeap`.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns true if this `PairingHeap` is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Returns the store that owns the memory of all nodes.
	#[inline]
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Makes room for at least `capacity` elements in total.
	///
	/// This never changes the behaviour of the heap, only when memory is requested.
	#[inline]
	pub fn reserve(&mut self, capacity: usize) -> Result<()> {
		self.store.reserve(capacity)
	}

	/// Returns a reference to the `Node` that is associated with the given index.
	/// Note that this won't fail on usage for a correct implementation of `PairingHeap`.
	#[inline]
	fn node(&self, index: Index) -> &Node<T> {
		debug_assert!(self.store.get(index).is_some(), "dangling link {:?}", index);
		unsafe { self.store.get(index).unchecked_unwrap() }
	}

	/// Returns a mutable reference to the `Node` that is associated with the given index.
	/// Note that this won't fail on usage for a correct implementation of `PairingHeap`.
	#[inline]
	fn node_mut(&mut self, index: Index) -> &mut Node<T> {
		debug_assert!(self.store.get(index).is_some(), "dangling link {:?}", index);
		unsafe { self.store.get_mut(index).unchecked_unwrap() }
	}

	/// Links two trees, making the one with the greater key the leftmost child
	/// of the other and returns the root of the result.
	///
	/// On equal keys `fst` stays on top.
	fn link(&mut self, fst: Index, snd: Index) -> Index {
		debug_assert!(fst != snd, "cannot link to self!");
		debug_assert!(self.node(fst).is_root() && self.node(snd).is_root());

		let (upper, lower) = if self.node(fst).key <= self.node(snd).key {
			(fst, snd)
		}
		else {
			(snd, fst)
		};

		let first_child = self.node(upper).child;
		if let Some(child) = first_child {
			self.node_mut(child).prev = Prev::Left(lower);
		}
		{
			let lower_node = self.node_mut(lower);
			lower_node.prev    = Prev::Parent(upper);
			lower_node.sibling = first_child;
		}
		self.node_mut(upper).child = Some(lower);
		upper
	}

	/// Melds two possibly empty trees.
	#[inline]
	fn merge(&mut self, fst: Option<Index>, snd: Option<Index>) -> Option<Index> {
		match (fst, snd) {
			(Some(fst), Some(snd)) => Some(self.link(fst, snd)),
			(fst, None)            => fst,
			(None, snd)            => snd
		}
	}

	/// Inserts the given key into the `PairingHeap` and returns a `Handle` to it
	/// that allows to directly address it, e.g. with `decrease_key`.
	pub fn insert(&mut self, key: T) -> Result<Handle> {
		let index = self.store.allocate(Node::singleton(key))?;
		let root  = self.root;
		self.root = self.merge(root, Some(index));
		self.len += 1;
		Ok(Handle(index))
	}

	/// Returns a reference to the minimum key.
	///
	/// Fails with `Error::EmptyHeap` if there is none.
	#[inline]
	pub fn min(&self) -> Result<&T> {
		self.root
			.map(|root| &self.node(root).key)
			.ok_or(Error::EmptyHeap)
	}

	/// Returns a copy of the minimum key.
	#[inline]
	pub fn min_cloned(&self) -> Result<T>
		where T: Clone
	{
		self.min().map(T::clone)
	}

	/// Returns a reference to the key that is associated with the given handle.
	///
	/// Fails with `Error::StaleHandle` if that key already left the heap.
	#[inline]
	pub fn get(&self, handle: Handle) -> Result<&T> {
		self.store
			.get(handle.0)
			.map(|node| &node.key)
			.ok_or(Error::StaleHandle)
	}

	/// Returns true if the element of the given handle is still in the heap.
	#[inline]
	pub fn contains(&self, handle: Handle) -> bool {
		self.store.get(handle.0).is_some()
	}

	/// Unhooks the given node and its subtree from the tree.
	///
	/// The remaining siblings stay linked in their original order.
	fn cut(&mut self, index: Index) {
		let (prev, next) = {
			let node = self.node(index);
			(node.prev, node.sibling)
		};
		debug_assert!(prev != Prev::Detached, "cannot cut a root!");

		match prev {
			Prev::Parent(parent) => self.node_mut(parent).child = next,
			Prev::Left(left)     => self.node_mut(left).sibling = next,
			Prev::Detached       => return
		}
		if let Some(next) = next {
			self.node_mut(next).prev = prev;
		}

		let node = self.node_mut(index);
		node.prev    = Prev::Detached;
		node.sibling = None;
	}

	/// Decreases the key of the element with the associated given `handle`.
	///
	/// Fails with `Error::DecreaseKeyOutOfOrder` if `new_key` is greater than the
	/// current key and with `Error::StaleHandle` if the element already left the
	/// heap. In both cases the heap is left untouched.
	pub fn decrease_key(&mut self, handle: Handle, new_key: T) -> Result<()> {
		let index = handle.0;
		match self.store.get(index) {
			None                              => return Err(Error::StaleHandle),
			Some(node) if new_key > node.key  => return Err(Error::DecreaseKeyOutOfOrder),
			Some(_)                           => ()
		}

		self.node_mut(index).key = new_key;
		if self.root == Some(index) {
			return Ok(())
		}

		self.cut(index);
		let root  = self.root;
		self.root = self.merge(root, Some(index));
		Ok(())
	}

	/// Removes the minimum key from this `PairingHeap` and returns it.
	///
	/// Fails with `Error::EmptyHeap` if there is none.
	pub fn delete_min(&mut self) -> Result<T> {
		let root  = self.root.ok_or(Error::EmptyHeap)?;
		let first = self.node(root).child;
		let node  = unsafe { self.store.deallocate(root).unchecked_unwrap() };
		self.len -= 1;
		self.root = self.consolidate(first);
		Ok(node.key)
	}

	/// Combines the sibling list starting at `first` into a single tree.
	///
	/// The first pass links adjacent pairs from left to right, the second pass
	/// folds the resulting trees from right to left.
	fn consolidate(&mut self, first: Option<Index>) -> Option<Index> {
		let mut forest = mem::replace(&mut self.forest, Vec::new());
		let mut pairs  = mem::replace(&mut self.pairs, Vec::new());

		let mut cursor = first;
		while let Some(index) = cursor {
			let node = self.node_mut(index);
			cursor       = node.sibling.take();
			node.prev    = Prev::Detached;
			forest.push(index);
		}

		let odd = {
			let mut tuples = forest.drain(..).tuples::<(_, _)>();
			for (left, right) in &mut tuples {
				pairs.push(self.link(left, right));
			}
			tuples.into_buffer().next()
		};

		let root = odd.into_iter()
			.chain(pairs.drain(..).rev())
			.fold(None, |acc, tree| self.merge(Some(tree), acc));

		self.forest = forest;
		self.pairs  = pairs;
		root
	}

	/// Melds `other` into this `PairingHeap`, leaving `other` empty.
	///
	/// The nodes of `other` move into the store of `self`, keeping their shape.
	/// Handles issued by `other` are stale afterwards and are rejected by both
	/// heaps, unless `self` was empty, in which case the heaps simply trade
	/// places and those handles stay valid for `self`.
	///
	/// Fails with `Error::AllocationExhausted` if `self` cannot make room for the
	/// nodes of `other`, leaving both heaps untouched.
	pub fn meld(&mut self, other: &mut Self) -> Result<()> {
		if other.is_empty() {
			return Ok(())
		}
		if self.is_empty() {
			mem::swap(self, other);
			return Ok(())
		}

		// allocations into `self` cannot fail past this point
		let total = self.store.len() + other.store.len();
		self.store.reserve(total)?;
		trace!("melding {} nodes into a heap of {}", other.len, self.len);

		let other_root = other.transfer_into(self)?;
		let root  = self.root;
		self.root = self.merge(root, Some(other_root));
		Ok(())
	}

	/// Moves every node of this heap into the store of `target`, keeping the
	/// tree shape, and returns the root of the moved tree. Leaves this heap empty.
	fn transfer_into(&mut self, target: &mut Self) -> Result<Index> {
		let root = self.root.take().ok_or(Error::EmptyHeap)?;
		let moved = self.len;
		self.len = 0;

		let mut new_root = None;
		let mut stack    = vec![(root, Prev::Detached)];
		while let Some((index, prev)) = stack.pop() {
			let node = unsafe { self.store.deallocate(index).unchecked_unwrap() };
			let mut copy = Node::singleton(node.key);
			copy.prev = prev;
			let copied = target.store.allocate(copy)?;

			match prev {
				Prev::Detached       => new_root = Some(copied),
				Prev::Parent(parent) => target.node_mut(parent).child = Some(copied),
				Prev::Left(left)     => target.node_mut(left).sibling = Some(copied)
			}
			if let Some(sibling) = node.sibling {
				stack.push((sibling, Prev::Left(copied)));
			}
			if let Some(child) = node.child {
				stack.push((child, Prev::Parent(copied)));
			}
		}

		target.len += moved;
		new_root.ok_or(Error::EmptyHeap)
	}

	/// Removes every element, returning all nodes to the store.
	///
	/// Does nothing for an empty heap.
	pub fn clear(&mut self) {
		let mut stack = self.root.take().into_iter().collect::<Vec<_>>();
		if !stack.is_empty() {
			trace!("clearing {} nodes", self.len);
		}
		while let Some(index) = stack.pop() {
			if let Some(node) = self.store.deallocate(index) {
				stack.extend(node.child);
				stack.extend(node.sibling);
			}
		}
		self.len = 0;
	}

	/// Iterate over keys stored within a `PairingHeap` in a sorted-by-min order. Drains the heap.
	#[inline]
	pub fn drain_min(self) -> DrainMin<T, S> {
		DrainMin{heap: self}
	}
}

/// Iterator over keys stored within a `PairingHeap` in a sorted-by-min order. Drains the heap.
pub struct DrainMin<T, S>
	where T: Key,
	      S: NodeStore<Node<T>>
{
	heap: PairingHeap<T, S>
}

impl<T, S> Iterator for DrainMin<T, S>
	where T: Key,
	      S: NodeStore<Node<T>>
{
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<Self::Item> {
		self.heap.delete_min().ok()
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.heap.len(), Some(self.heap.len()))
	}
}
