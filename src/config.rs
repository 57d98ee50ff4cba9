use crate::arena::BLOCK_SIZE;

/// Construction parameters for an arena backed `PairingHeap`.
///
/// ```
/// use arena_pairing_heap::{Config, PairingHeap};
///
/// let config = Config::default().with_block_size(1024).with_reserve(5000);
/// let heap: PairingHeap<u32> = PairingHeap::with_config(config).unwrap();
/// assert_eq!(5 * 1024, heap.store().capacity());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
	/// Number of nodes per arena block.
	pub block_size: usize,

	/// Number of nodes to make room for up front, e.g. the vertex count of a graph.
	pub reserve: usize
}

impl Default for Config {
	fn default() -> Self {
		Config{
			block_size: BLOCK_SIZE,
			reserve   : 0
		}
	}
}

impl Config {
	/// Sets the number of nodes per arena block.
	pub fn with_block_size(self, block_size: usize) -> Self {
		Config{ block_size: block_size, .. self }
	}

	/// Sets the number of nodes to make room for up front.
	pub fn with_reserve(self, reserve: usize) -> Self {
		Config{ reserve: reserve, .. self }
	}
}
