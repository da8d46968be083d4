//! Comparators for ordering heap elements
//!
//! A heap is a min-heap with respect to its comparator: the element that
//! compares [`Ordering::Less`] than every other comes out first. Swapping the
//! comparator turns the same algorithm into a max-heap or any custom
//! priority order.
//!
//! Any closure `Fn(&T, &T) -> Ordering` is a comparator:
//!
//! ```rust
//! use fibonacci_pq::FibonacciHeap;
//!
//! // Order tasks by their second field, longest first.
//! let mut heap = FibonacciHeap::with_comparator(|a: &(&str, u32), b: &(&str, u32)| b.1.cmp(&a.1));
//! heap.push(("short", 1));
//! heap.push(("long", 9));
//! assert_eq!(heap.pop(), Ok(("long", 9)));
//! ```

use std::cmp::Ordering;

/// A strict weak order over `T`
pub trait Compare<T: ?Sized> {
    /// Compares two elements; `Less` means `a` leaves the heap before `b`
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Returns true if `a` comes strictly before `b`
    #[inline]
    fn precedes(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns true if neither element comes before the other
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Natural `Ord` order: smallest element first (min-heap)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MinOrder;

impl<T: Ord + ?Sized> Compare<T> for MinOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Reversed `Ord` order: largest element first (max-heap)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MaxOrder;

impl<T: Ord + ?Sized> Compare<T> for MaxOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_order() {
        assert!(MinOrder.precedes(&1, &2));
        assert!(!MinOrder.precedes(&2, &1));
        assert!(!MinOrder.precedes(&2, &2));
        assert!(MinOrder.equivalent(&2, &2));
    }

    #[test]
    fn test_max_order() {
        assert!(MaxOrder.precedes(&2, &1));
        assert!(!MaxOrder.precedes(&1, &2));
    }

    #[test]
    fn test_closure_comparator() {
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        assert!(by_len.precedes(&"ab", &"abc"));
        // Same length is equivalent even though the strings differ
        assert!(by_len.equivalent(&"ab", &"cd"));
    }
}
