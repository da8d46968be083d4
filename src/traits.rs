//! Common traits and error types for priority queues
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`Heap`]: push / peek / pop / merge over plain values
//! - [`DecreaseKeyHeap`]: adds handle-returning insertion, `decrease_key` and
//!   removal of arbitrary elements
//!
//! Unlike `std::collections::BinaryHeap`, peeking or popping an empty heap is
//! an error ([`HeapError::Empty`]) rather than `None`, so callers have to
//! handle the empty case explicitly.

use thiserror::Error;

/// Coarse classification of a [`HeapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation needs at least one element
    EmptyContainer,
    /// The arguments are not acceptable for the current heap state
    InvalidOperation,
}

/// Error type for heap operations
///
/// A failing operation never mutates the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum HeapError {
    /// `peek` or `pop` on a heap with no elements
    #[error("heap is empty")]
    Empty,
    /// The new value comes strictly after the current one under the comparator
    #[error("new value does not precede the current value")]
    PriorityNotDecreased,
    /// The handle was removed, or was issued by a different heap
    #[error("handle is no longer valid (element was removed or belongs to another heap)")]
    InvalidHandle,
}

impl HeapError {
    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeapError::Empty => ErrorKind::EmptyContainer,
            HeapError::PriorityNotDecreased | HeapError::InvalidHandle => {
                ErrorKind::InvalidOperation
            }
        }
    }
}

/// A handle to an element in the heap, used for decrease_key operations
///
/// Handles are addressing tokens only. They confer no ownership and are
/// rejected once the element they name has left the heap.
pub trait Handle: Copy + PartialEq + Eq + std::hash::Hash + std::fmt::Debug {}

/// Base trait for priority queues
///
/// # Example
///
/// ```rust
/// use fibonacci_pq::{FibonacciHeap, Heap};
///
/// fn drain<H: Heap<i32>>(values: &[i32]) -> Vec<i32> {
///     let mut heap = H::new();
///     for &v in values {
///         heap.push(v);
///     }
///     let mut out = Vec::new();
///     while let Ok(v) = heap.pop() {
///         out.push(v);
///     }
///     out
/// }
///
/// assert_eq!(drain::<FibonacciHeap<i32>>(&[3, 1, 2]), vec![1, 2, 3]);
/// ```
pub trait Heap<T> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element
    ///
    /// # Time Complexity
    /// O(1) amortized for Fibonacci heaps.
    fn push(&mut self, value: T);

    /// Returns the first element under the heap's order without removing it
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no elements.
    fn peek(&self) -> Result<&T, HeapError>;

    /// Removes and returns the first element under the heap's order
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no elements.
    ///
    /// # Time Complexity
    /// O(log n) amortized.
    fn pop(&mut self) -> Result<T, HeapError>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use fibonacci_pq::{DecreaseKeyHeap, FibonacciHeap};
///
/// fn lower_first<H: DecreaseKeyHeap<i32>>() -> i32 {
///     let mut heap = H::new();
///     let handle = heap.push_with_handle(10);
///     heap.push(7);
///     heap.decrease_key(&handle, 5).unwrap();
///     *heap.peek().unwrap()
/// }
///
/// assert_eq!(lower_first::<FibonacciHeap<i32>>(), 5);
/// ```
pub trait DecreaseKeyHeap<T>: Heap<T> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element, returning a handle to it
    fn push_with_handle(&mut self, value: T) -> Self::Handle;

    /// Replaces the value behind `handle` with one that does not come after it
    ///
    /// # Errors
    /// - [`HeapError::PriorityNotDecreased`] if `new_value` comes strictly
    ///   after the current value
    /// - [`HeapError::InvalidHandle`] if the handle is stale or foreign
    ///
    /// # Time Complexity
    /// O(1) amortized for Fibonacci heaps.
    fn decrease_key(&mut self, handle: &Self::Handle, new_value: T) -> Result<(), HeapError>;

    /// Removes the element behind `handle` and returns it
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the handle is stale or foreign.
    fn remove(&mut self, handle: &Self::Handle) -> Result<T, HeapError>;
}
