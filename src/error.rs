use thiserror::Error;

/// Errors that can be caused while using `PairingHeap` or its node stores.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
	/// Caused when querying or removing the minimum of an empty heap.
	#[error("heap is empty")]
	EmptyHeap,

	/// Caused when using `decrease_key` method with a `new_key` that is greater than the old one.
	#[error("new key is greater than the current key")]
	DecreaseKeyOutOfOrder,

	/// Caused when a handle refers to an element that was already removed.
	#[error("handle refers to an element that is no longer in the heap")]
	StaleHandle,

	/// Caused when node storage cannot grow any further.
	#[error("node storage cannot grow any further")]
	AllocationExhausted,

	/// Caused when configuring an arena with blocks of zero slots.
	#[error("block size must be greater than zero")]
	ZeroBlockSize
}

/// Generic `Result` type for `PairingHeap` methods.
pub type Result<T> = ::std::result::Result<T, Error>;
