//! Mergeable Fibonacci-heap priority queue
//!
//! This crate provides a Fibonacci heap with handle-based `decrease_key`,
//! built on an index arena instead of raw pointers.
//!
//! # Features
//!
//! - **O(1) amortized** push, peek, merge of root lists and decrease_key
//! - **O(log n) amortized** pop and arbitrary removal
//! - **Injectable order**: min-heap by default, [`MaxOrder`] or any
//!   `Fn(&T, &T) -> Ordering` closure for custom priorities
//! - **Checked handles**: stale or foreign handles fail with
//!   [`HeapError::InvalidHandle`] instead of corrupting the heap
//! - **Deep clones**: a cloned heap owns an independent copy of every node
//!
//! # Example
//!
//! ```rust
//! use fibonacci_pq::{FibonacciHeap, HeapError};
//!
//! let mut heap = FibonacciHeap::new();
//! heap.push(5);
//! heap.push(3);
//! let eight = heap.push(8);
//! heap.push(1);
//!
//! assert_eq!(heap.peek(), Ok(&1));
//! assert_eq!(heap.pop(), Ok(1));
//! assert_eq!(heap.peek(), Ok(&3));
//!
//! heap.decrease_key(&eight, 0).unwrap();
//! assert_eq!(heap.pop(), Ok(0));
//! assert_eq!(heap.pop(), Ok(3));
//! assert_eq!(heap.pop(), Ok(5));
//! assert_eq!(heap.pop(), Err(HeapError::Empty));
//! ```
//!
//! # Cargo features
//!
//! - `invariant-checks`: re-verify the whole structure after every mutating
//!   operation and panic on the first violation. Costs O(n) per operation.

pub mod compare;
pub mod fibonacci;
mod storage;
pub mod traits;

pub use compare::{Compare, MaxOrder, MinOrder};
pub use fibonacci::{DrainSorted, FibonacciHandle, FibonacciHeap, InvariantViolation};
pub use storage::NodeKey;
pub use traits::{DecreaseKeyHeap, ErrorKind, Handle, Heap, HeapError};
