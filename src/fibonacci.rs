//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a priority queue with:
//! - O(1) amortized push, peek and decrease_key
//! - O(log n) amortized pop
//!
//! The structure is a collection of heap-ordered trees whose roots are linked
//! in a circular doubly linked list; the heap remembers which root comes
//! first. Push only adds a root. Pop removes the first root, promotes its
//! children and then *consolidates*: roots of equal degree are linked
//! pairwise until every root degree is distinct, which keeps the number of
//! roots logarithmic. Decrease-key cuts a node out of its tree when it
//! overtakes its parent; a parent that loses a second child is cut as well
//! (*cascading cut*), which bounds how thin a tree of a given degree can get.
//!
//! Nodes live in an index arena keyed by generational [`NodeKey`]s. Handles
//! carry the key plus the identity of the heap that issued them, so a
//! stale or foreign handle is reported as [`HeapError::InvalidHandle`]
//! instead of touching freed memory.

use crate::compare::{Compare, MinOrder};
use crate::storage::{NodeArena, NodeKey};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
use smallvec::SmallVec;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use thiserror::Error;

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct HeapId(u64);

impl HeapId {
    fn next() -> Self {
        HeapId(NEXT_HEAP_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Handle to an element in a Fibonacci heap
///
/// Handles are only valid for the heap that issued them and only while the
/// element is still stored. Clones of a heap issue their own handles; use
/// [`FibonacciHeap::handles`] or [`FibonacciHeap::find`] to address elements
/// of a clone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    heap: HeapId,
    key: NodeKey,
}

impl Handle for FibonacciHandle {}

/// A broken structural invariant found by [`FibonacciHeap::check_invariants`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("sibling ring is not doubly linked at {0:?}")]
    MalformedRing(NodeKey),
    #[error("node {node:?} does not point back at its parent {expected:?}")]
    ParentMismatch {
        node: NodeKey,
        expected: Option<NodeKey>,
    },
    #[error("node {node:?} records degree {recorded} but has {actual} children")]
    DegreeMismatch {
        node: NodeKey,
        recorded: usize,
        actual: usize,
    },
    #[error("child {0:?} precedes its parent")]
    HeapOrder(NodeKey),
    #[error("root {0:?} precedes the recorded minimum")]
    MinNotFirst(NodeKey),
    #[error("root {0:?} is marked")]
    MarkedRoot(NodeKey),
    #[error("minimum is missing or is not a root")]
    BadMin,
    #[error("{reachable} nodes reachable from the root list but {stored} stored")]
    CountMismatch { reachable: usize, stored: usize },
}

/// Fibonacci Heap
///
/// `C` decides the order; the default [`MinOrder`] makes this a min-heap
/// over `T: Ord`.
///
/// # Example
///
/// ```rust
/// use fibonacci_pq::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(5);
/// let handle = heap.push(8);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Ok(&1));
/// assert_eq!(heap.pop(), Ok(1));
/// assert_eq!(heap.pop(), Ok(5));
/// ```
pub struct FibonacciHeap<T, C = MinOrder> {
    arena: NodeArena<T>,
    min: Option<NodeKey>,
    id: HeapId,
    comparator: C,
}

impl<T: Ord> FibonacciHeap<T> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparator(MinOrder)
    }

    /// Creates an empty min-heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, MinOrder)
    }
}

impl<T, C: Default> Default for FibonacciHeap<T, C> {
    fn default() -> Self {
        Self {
            arena: NodeArena::default(),
            min: None,
            id: HeapId::next(),
            comparator: C::default(),
        }
    }
}

impl<T, C: Compare<T>> FibonacciHeap<T, C> {
    /// Creates an empty heap ordered by `comparator`
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_capacity_and_comparator(0, comparator)
    }

    /// Creates an empty heap ordered by `comparator` with room for `capacity` elements
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            min: None,
            id: HeapId::next(),
            comparator,
        }
    }

    /// Returns the comparator ordering this heap
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns how many elements the heap can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Reserves room for at least `additional` more elements
    pub fn reserve(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Removes every element; all outstanding handles become invalid
    pub fn clear(&mut self) {
        self.arena.clear();
        self.min = None;
    }

    /// Inserts a value and returns a handle to it
    ///
    /// The value becomes a new root next to the current minimum. No
    /// restructuring happens here; it is deferred to [`pop`](Self::pop).
    ///
    /// # Time Complexity
    /// O(1)
    pub fn push(&mut self, value: T) -> FibonacciHandle {
        let key = self.arena.insert(value);
        self.add_root(key);
        self.debug_check();
        self.handle(key)
    }

    /// Returns the first element without removing it
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no elements.
    pub fn peek(&self) -> Result<&T, HeapError> {
        self.min
            .map(|min| &self.arena[min].value)
            .ok_or(HeapError::Empty)
    }

    /// Removes and returns the first element
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no elements.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn pop(&mut self) -> Result<T, HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;

        // Promote the children: clear their parent links and marks, then
        // splice the whole child ring into the root list at once.
        if let Some(child) = self.arena[min].child.take() {
            let mut current = child;
            loop {
                let node = &mut self.arena[current];
                node.parent = None;
                node.marked = false;
                current = node.right;
                if current == child {
                    break;
                }
            }
            self.arena.concat(min, child);
            self.arena[min].degree = 0;
        }

        match self.arena.unlink(min) {
            None => self.min = None,
            Some(start) => {
                self.min = Some(start);
                self.consolidate(start);
            }
        }

        let Some(value) = self.arena.remove(min) else {
            unreachable!("minimum root {min:?} is not in the arena");
        };
        self.debug_check();
        Ok(value)
    }

    /// Replaces the value behind `handle` with `new_value`
    ///
    /// `new_value` must not come after the current value; an equivalent
    /// value is accepted. If the node now precedes its parent it is cut to
    /// the root list, followed by cascading cuts of marked ancestors.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the handle is stale or foreign
    /// - [`HeapError::PriorityNotDecreased`] if `new_value` comes strictly
    ///   after the current value
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(&mut self, handle: &FibonacciHandle, new_value: T) -> Result<(), HeapError> {
        let key = self.resolve(handle)?;
        if self.comparator.precedes(&self.arena[key].value, &new_value) {
            return Err(HeapError::PriorityNotDecreased);
        }
        self.arena[key].value = new_value;

        if let Some(parent) = self.arena[key].parent {
            if self.precedes(key, parent) {
                self.cut(key);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.precedes(key, min) {
                self.min = Some(key);
            }
        }

        self.debug_check();
        Ok(())
    }

    /// Removes the element behind `handle` and returns it
    ///
    /// The node is moved to the root list as though its key had been
    /// decreased below everything else, made the minimum, and popped.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the handle is stale or foreign.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn remove(&mut self, handle: &FibonacciHandle) -> Result<T, HeapError> {
        let key = self.resolve(handle)?;
        if let Some(parent) = self.arena[key].parent {
            self.cut(key);
            self.cascading_cut(parent);
        }
        self.min = Some(key);
        self.pop()
    }

    /// Moves every element of `other` into this heap
    ///
    /// Each element of `other` is re-keyed into this heap's arena as a new
    /// root, so `other`'s tree shape is dropped and only this heap's
    /// comparator decides order from here on. Two comparators of the same
    /// type may still disagree (a closure capturing state, say). Nothing is
    /// consolidated until the next [`pop`](Self::pop). Handles issued by
    /// `other` are rejected afterwards.
    ///
    /// # Time Complexity
    /// O(other.len())
    pub fn merge(&mut self, mut other: Self) {
        self.arena.reserve(other.arena.len());
        for (_, node) in other.arena.drain() {
            let key = self.arena.insert(node.value);
            self.add_root(key);
        }
        self.debug_check();
    }

    /// Returns the value behind `handle`
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the handle is stale or foreign.
    pub fn get(&self, handle: &FibonacciHandle) -> Result<&T, HeapError> {
        let key = self.resolve(handle)?;
        Ok(&self.arena[key].value)
    }

    /// Returns true if `handle` still names an element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Finds an element equivalent to `value` under the comparator
    ///
    /// This is a linear scan; prefer keeping the handle returned by
    /// [`push`](Self::push).
    pub fn find(&self, value: &T) -> Option<FibonacciHandle> {
        self.arena
            .iter()
            .find(|(_, node)| self.comparator.equivalent(&node.value, value))
            .map(|(key, _)| self.handle(key))
    }

    /// Decreases the first element found equivalent to `current`
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if no equivalent element is stored
    /// - [`HeapError::PriorityNotDecreased`] as for [`decrease_key`](Self::decrease_key)
    pub fn decrease_value(&mut self, current: &T, new_value: T) -> Result<(), HeapError> {
        let handle = self.find(current).ok_or(HeapError::InvalidHandle)?;
        self.decrease_key(&handle, new_value)
    }

    /// Iterates over the elements in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.arena.iter().map(|(_, node)| &node.value)
    }

    /// Iterates over handles to every element, in arbitrary order
    pub fn handles(&self) -> impl Iterator<Item = FibonacciHandle> + '_ {
        self.arena.keys().map(move |key| self.handle(key))
    }

    /// Consumes the heap and returns its elements in pop order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Ok(value) = self.pop() {
            sorted.push(value);
        }
        sorted
    }

    /// Pops elements lazily in order; elements not yielded stay in the heap
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, T, C> {
        DrainSorted { heap: self }
    }

    /// Degrees of the current roots, starting from the minimum
    pub fn root_degrees(&self) -> Vec<usize> {
        match self.min {
            None => Vec::new(),
            Some(min) => self
                .arena
                .ring_iter(min)
                .map(|root| self.arena[root].degree)
                .collect(),
        }
    }

    /// Returns true if no two roots share a degree
    ///
    /// This holds right after [`pop`](Self::pop); pushes and cuts are free
    /// to add roots of any degree in between.
    pub fn roots_have_unique_degrees(&self) -> bool {
        let mut degrees = self.root_degrees();
        let count = degrees.len();
        degrees.sort_unstable();
        degrees.dedup();
        degrees.len() == count
    }

    /// Verifies every structural invariant of the heap
    ///
    /// Checks that sibling rings are doubly linked, parent links and degrees
    /// match, children never precede parents, roots are unmarked, the minimum
    /// is a root that no other root precedes, and every stored node is
    /// reachable from the root list.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let stored = self.arena.len();
        let Some(min) = self.min else {
            return if stored == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::BadMin)
            };
        };
        if self.arena.get(min).map_or(true, |node| node.parent.is_some()) {
            return Err(InvariantViolation::BadMin);
        }

        let mut reachable = 0;
        // (first node of a ring, parent shared by the ring)
        let mut pending = vec![(min, None)];
        while let Some((start, parent)) = pending.pop() {
            let mut siblings = 0;
            let mut current = start;
            loop {
                reachable += 1;
                siblings += 1;
                if reachable > stored {
                    return Err(InvariantViolation::CountMismatch { reachable, stored });
                }
                let node = &self.arena[current];
                if self.arena[node.left].right != current || self.arena[node.right].left != current {
                    return Err(InvariantViolation::MalformedRing(current));
                }
                if node.parent != parent {
                    return Err(InvariantViolation::ParentMismatch {
                        node: current,
                        expected: parent,
                    });
                }
                match parent {
                    Some(p) if self.precedes(current, p) => {
                        return Err(InvariantViolation::HeapOrder(current));
                    }
                    None if node.marked => return Err(InvariantViolation::MarkedRoot(current)),
                    None if self.precedes(current, min) => {
                        return Err(InvariantViolation::MinNotFirst(current));
                    }
                    _ => {}
                }
                if let Some(child) = node.child {
                    pending.push((child, Some(current)));
                }
                current = node.right;
                if current == start {
                    break;
                }
            }

            if let Some(p) = parent {
                let recorded = self.arena[p].degree;
                if recorded != siblings {
                    return Err(InvariantViolation::DegreeMismatch {
                        node: p,
                        recorded,
                        actual: siblings,
                    });
                }
            }
        }

        // Childless nodes were never visited as a parent; their degree must be zero.
        if let Some((node, record)) = self
            .arena
            .iter()
            .find(|(_, record)| record.child.is_none() && record.degree != 0)
        {
            return Err(InvariantViolation::DegreeMismatch {
                node,
                recorded: record.degree,
                actual: 0,
            });
        }

        if reachable != stored {
            return Err(InvariantViolation::CountMismatch { reachable, stored });
        }
        Ok(())
    }

    fn handle(&self, key: NodeKey) -> FibonacciHandle {
        FibonacciHandle { heap: self.id, key }
    }

    fn resolve(&self, handle: &FibonacciHandle) -> Result<NodeKey, HeapError> {
        if handle.heap == self.id && self.arena.contains(handle.key) {
            Ok(handle.key)
        } else {
            Err(HeapError::InvalidHandle)
        }
    }

    #[inline]
    fn precedes(&self, a: NodeKey, b: NodeKey) -> bool {
        self.comparator
            .precedes(&self.arena[a].value, &self.arena[b].value)
    }

    /// Splices a detached singleton into the root list next to the minimum
    fn add_root(&mut self, key: NodeKey) {
        match self.min {
            None => self.min = Some(key),
            Some(min) => {
                self.arena.splice_before(min, key);
                if self.precedes(key, min) {
                    self.min = Some(key);
                }
            }
        }
    }

    /// Links roots of equal degree until all root degrees are distinct
    ///
    /// `start` must be a root; `self.min` is recomputed from the survivors.
    fn consolidate(&mut self, start: NodeKey) {
        // Max degree is O(log n); 64 slots covers any realistic heap inline.
        let mut by_degree: SmallVec<[Option<NodeKey>; 64]> = SmallVec::new();

        for root in self.arena.ring(start) {
            let mut tree = root;
            let mut degree = self.arena[tree].degree;
            loop {
                if degree >= by_degree.len() {
                    by_degree.resize(degree + 1, None);
                }
                let Some(other) = by_degree[degree].take() else {
                    break;
                };
                // The tabled root keeps its place unless the newcomer strictly precedes it.
                let (winner, loser) = if self.precedes(tree, other) {
                    (tree, other)
                } else {
                    (other, tree)
                };
                self.link(loser, winner);
                tree = winner;
                degree += 1;
            }
            by_degree[degree] = Some(tree);
        }

        // Losers were unlinked as they went, so the root ring already holds
        // exactly the tabled trees; only the minimum needs recomputing.
        let mut min: Option<NodeKey> = None;
        for root in by_degree.into_iter().flatten() {
            min = match min {
                Some(current) if !self.precedes(root, current) => Some(current),
                _ => Some(root),
            };
        }
        self.min = min;
    }

    /// Makes root `child` a child of root `parent`
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        self.arena.unlink(child);
        {
            let node = &mut self.arena[child];
            node.parent = Some(parent);
            node.marked = false;
        }
        match self.arena[parent].child {
            Some(first) => self.arena.splice_before(first, child),
            None => self.arena[parent].child = Some(child),
        }
        self.arena[parent].degree += 1;
    }

    /// Detaches `key` from its parent and makes it an unmarked root
    fn cut(&mut self, key: NodeKey) {
        let Some(parent) = self.arena[key].parent else {
            return;
        };
        let next = self.arena.unlink(key);
        {
            let parent_node = &mut self.arena[parent];
            if parent_node.child == Some(key) {
                parent_node.child = next;
            }
            parent_node.degree -= 1;
        }
        {
            let node = &mut self.arena[key];
            node.parent = None;
            node.marked = false;
        }
        self.add_root(key);
    }

    /// Walks up from `key`: marks the first unmarked non-root ancestor, cutting
    /// every marked one on the way
    fn cascading_cut(&mut self, mut key: NodeKey) {
        while let Some(parent) = self.arena[key].parent {
            if !self.arena[key].marked {
                self.arena[key].marked = true;
                return;
            }
            self.cut(key);
            key = parent;
        }
    }

    #[inline]
    fn debug_check(&self) {
        #[cfg(feature = "invariant-checks")]
        {
            if let Err(violation) = self.check_invariants() {
                panic!("Fibonacci heap invariant violated: {violation}");
            }
        }
    }
}

impl<T: Clone, C: Clone> Clone for FibonacciHeap<T, C> {
    /// Deep copy: the clone owns its own nodes with the same values and tree
    /// shape, and issues its own handles.
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            min: self.min,
            id: HeapId::next(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for FibonacciHeap<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.arena.len())
            .field("min", &self.min.map(|min| &self.arena[min].value))
            .finish()
    }
}

impl<T, C: Compare<T>> Extend<T> for FibonacciHeap<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for FibonacciHeap<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}

/// Iterator returned by [`FibonacciHeap::drain_sorted`]
pub struct DrainSorted<'a, T, C: Compare<T>> {
    heap: &'a mut FibonacciHeap<T, C>,
}

impl<T, C: Compare<T>> Iterator for DrainSorted<'_, T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.heap.pop().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.heap.len();
        (len, Some(len))
    }
}

impl<T, C: Compare<T>> ExactSizeIterator for DrainSorted<'_, T, C> {}

impl<T, C: Compare<T>> FusedIterator for DrainSorted<'_, T, C> {}

impl<T, C: Compare<T> + Default> Heap<T> for FibonacciHeap<T, C> {
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, value: T) {
        FibonacciHeap::push(self, value);
    }

    fn peek(&self) -> Result<&T, HeapError> {
        FibonacciHeap::peek(self)
    }

    fn pop(&mut self) -> Result<T, HeapError> {
        FibonacciHeap::pop(self)
    }

    fn merge(&mut self, other: Self) {
        FibonacciHeap::merge(self, other);
    }
}

impl<T, C: Compare<T> + Default> DecreaseKeyHeap<T> for FibonacciHeap<T, C> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, value: T) -> FibonacciHandle {
        FibonacciHeap::push(self, value)
    }

    fn decrease_key(&mut self, handle: &FibonacciHandle, new_value: T) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_value)
    }

    fn remove(&mut self, handle: &FibonacciHandle) -> Result<T, HeapError> {
        FibonacciHeap::remove(self, handle)
    }
}
