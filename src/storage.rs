//! Arena storage for heap nodes
//!
//! All nodes of a heap live in one [`SlotMap`]. Links between nodes (parent,
//! first child, left and right siblings) are [`NodeKey`]s rather than
//! pointers, so link surgery can never dangle or double-free:
//!
//! - Keys are generational. Removing a node recycles its slot through the
//!   slot map's free list and bumps the slot's generation, so an old key no
//!   longer resolves.
//! - Sibling lists are circular and doubly linked. A node that is alone in
//!   its ring points at itself in both directions.
//!
//! The ring primitives here only touch `left`/`right`. Parent, child, degree
//! and mark bookkeeping belongs to the heap.

use slotmap::{new_key_type, SlotMap};
use std::ops::{Index, IndexMut};

new_key_type! {
    /// Generational index of a node in a [`NodeArena`]
    pub struct NodeKey;
}

/// A heap node
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeKey>,
    /// Any one child; the rest are reachable through its sibling ring
    pub(crate) child: Option<NodeKey>,
    pub(crate) left: NodeKey,
    pub(crate) right: NodeKey,
    pub(crate) degree: usize,
    /// Lost a child since it was last linked under its current parent
    pub(crate) marked: bool,
}

/// Slot-map backed node storage with circular sibling rings
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<T> NodeArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Allocates a detached node that forms a ring of one
    pub(crate) fn insert(&mut self, value: T) -> NodeKey {
        self.nodes.insert_with_key(|key| Node {
            value,
            parent: None,
            child: None,
            left: key,
            right: key,
            degree: 0,
            marked: false,
        })
    }

    /// Frees a node's slot and returns its value
    ///
    /// The caller must already have unlinked the node from every ring.
    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<T> {
        self.nodes.remove(key).map(|node| node.value)
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node<T>> {
        self.nodes.get(key)
    }

    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub(crate) fn iter(&self) -> slotmap::basic::Iter<'_, NodeKey, Node<T>> {
        self.nodes.iter()
    }

    pub(crate) fn keys(&self) -> slotmap::basic::Keys<'_, NodeKey, Node<T>> {
        self.nodes.keys()
    }

    pub(crate) fn drain(&mut self) -> slotmap::basic::Drain<'_, NodeKey, Node<T>> {
        self.nodes.drain()
    }

    /// Makes `key` a ring of one
    pub(crate) fn make_singleton(&mut self, key: NodeKey) {
        let node = &mut self.nodes[key];
        node.left = key;
        node.right = key;
    }

    /// Inserts the singleton `key` immediately to the left of `at`
    pub(crate) fn splice_before(&mut self, at: NodeKey, key: NodeKey) {
        debug_assert_eq!(self.nodes[key].right, key, "node is already in a ring");
        let at_left = self.nodes[at].left;
        self.nodes[key].left = at_left;
        self.nodes[key].right = at;
        self.nodes[at_left].right = key;
        self.nodes[at].left = key;
    }

    /// Removes `key` from its ring, leaving it as a ring of one
    ///
    /// Returns the former right neighbour, or `None` if `key` was alone.
    pub(crate) fn unlink(&mut self, key: NodeKey) -> Option<NodeKey> {
        let (left, right) = {
            let node = &self.nodes[key];
            (node.left, node.right)
        };
        if right == key {
            return None;
        }
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.make_singleton(key);
        Some(right)
    }

    /// Joins the two disjoint rings containing `a` and `b` into one
    ///
    /// The ring of `b` ends up to the left of `a`.
    pub(crate) fn concat(&mut self, a: NodeKey, b: NodeKey) {
        let a_left = self.nodes[a].left;
        let b_left = self.nodes[b].left;
        self.nodes[a_left].right = b;
        self.nodes[b].left = a_left;
        self.nodes[b_left].right = a;
        self.nodes[a].left = b_left;
    }

    /// Collects the ring containing `start`, beginning at `start` and moving right
    ///
    /// Snapshotting lets callers restructure the ring while visiting it.
    pub(crate) fn ring(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut keys = vec![start];
        let mut current = self.nodes[start].right;
        while current != start {
            keys.push(current);
            current = self.nodes[current].right;
        }
        keys
    }

    /// Iterates the ring containing `start` without allocating
    pub(crate) fn ring_iter(&self, start: NodeKey) -> RingIter<'_, T> {
        RingIter {
            arena: self,
            start,
            next: Some(start),
        }
    }
}

impl<T> Index<NodeKey> for NodeArena<T> {
    type Output = Node<T>;

    fn index(&self, key: NodeKey) -> &Node<T> {
        &self.nodes[key]
    }
}

impl<T> IndexMut<NodeKey> for NodeArena<T> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Node<T> {
        &mut self.nodes[key]
    }
}

/// Single pass over one sibling ring
pub(crate) struct RingIter<'a, T> {
    arena: &'a NodeArena<T>,
    start: NodeKey,
    next: Option<NodeKey>,
}

impl<T> Iterator for RingIter<'_, T> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        let right = self.arena[current].right;
        self.next = if right == self.start {
            None
        } else {
            Some(right)
        };
        Some(current)
    }
}
