//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations, replay them on a
//! heap and on a plain reference model, and check after every step that the
//! two agree and that the heap's structural invariants hold.

use fibonacci_pq::{FibonacciHandle, FibonacciHeap, HeapError, MaxOrder};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    /// Decrease the `n`-th live element (mod live count) by `delta`
    DecreaseKey(usize, i32),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-1000i32..1000).prop_map(Op::Push),
        2 => Just(Op::Pop),
        3 => (any::<usize>(), 0i32..500).prop_map(|(i, d)| Op::DecreaseKey(i, d)),
        1 => any::<usize>().prop_map(Op::Remove),
    ]
}

/// Live elements as (handle, value) pairs, in push order
#[derive(Default)]
struct Model {
    live: Vec<(FibonacciHandle, i32)>,
}

impl Model {
    fn min(&self) -> Option<i32> {
        self.live.iter().map(|&(_, v)| v).min()
    }

    fn sorted(&self) -> Vec<i32> {
        let mut values: Vec<_> = self.live.iter().map(|&(_, v)| v).collect();
        values.sort_unstable();
        values
    }
}

fn apply(heap: &mut FibonacciHeap<i32>, model: &mut Model, op: &Op) -> Result<(), TestCaseError> {
    match *op {
        Op::Push(value) => {
            let handle = heap.push(value);
            model.live.push((handle, value));
        }
        Op::Pop => match model.min() {
            None => {
                prop_assert_eq!(heap.pop(), Err(HeapError::Empty));
            }
            Some(expected) => {
                prop_assert_eq!(heap.pop(), Ok(expected));
                // With ties, the heap decides which handle goes; find it.
                let gone = model
                    .live
                    .iter()
                    .position(|(h, v)| *v == expected && !heap.contains(h));
                prop_assert!(gone.is_some(), "popped element still addressable");
                model.live.remove(gone.unwrap());
                prop_assert!(heap.roots_have_unique_degrees());
            }
        },
        Op::DecreaseKey(index, delta) => {
            if model.live.is_empty() {
                return Ok(());
            }
            let slot = index % model.live.len();
            let (handle, value) = model.live[slot];
            heap.decrease_key(&handle, value - delta).unwrap();
            model.live[slot].1 = value - delta;
            prop_assert!(*heap.peek().unwrap() <= value - delta);
        }
        Op::Remove(index) => {
            if model.live.is_empty() {
                return Ok(());
            }
            let (handle, value) = model.live.remove(index % model.live.len());
            prop_assert_eq!(heap.remove(&handle), Ok(value));
            prop_assert!(!heap.contains(&handle));
        }
    }

    prop_assert_eq!(heap.len(), model.live.len());
    prop_assert_eq!(heap.is_empty(), model.live.is_empty());
    prop_assert_eq!(heap.peek().ok().copied(), model.min());
    prop_assert!(heap.check_invariants().is_ok(), "{:?}", heap.check_invariants());
    Ok(())
}

proptest! {
    #[test]
    fn test_ops_match_reference_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut heap = FibonacciHeap::new();
        let mut model = Model::default();
        for op in &ops {
            apply(&mut heap, &mut model, op)?;
        }
        prop_assert_eq!(heap.into_sorted_vec(), model.sorted());
    }

    #[test]
    fn test_pop_order_is_sorted_input(values in prop::collection::vec(any::<i32>(), 0..300)) {
        let mut heap = FibonacciHeap::new();
        for &v in &values {
            heap.push(v);
        }
        let mut expected = values.clone();
        expected.sort_unstable();

        let mut popped = Vec::with_capacity(values.len());
        while let Ok(v) = heap.pop() {
            prop_assert!(heap.roots_have_unique_degrees());
            popped.push(v);
        }
        prop_assert_eq!(popped, expected);
    }

    #[test]
    fn test_rejected_decrease_key_changes_nothing(
        values in prop::collection::vec(-100i32..100, 1..100),
        pops in 0usize..20,
        index in any::<usize>(),
        increase in 1i32..100,
    ) {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = values.iter().map(|&v| heap.push(v)).collect();
        let pops = pops.min(values.len() - 1);
        for _ in 0..pops {
            heap.pop().unwrap();
        }
        let live: Vec<_> = handles.iter().filter(|h| heap.contains(h)).collect();
        let handle = live[index % live.len()];
        let current = *heap.get(handle).unwrap();

        let degrees_before = heap.root_degrees();
        let contents_before = heap.clone().into_sorted_vec();

        prop_assert_eq!(
            heap.decrease_key(handle, current + increase),
            Err(HeapError::PriorityNotDecreased)
        );
        prop_assert_eq!(heap.get(handle), Ok(&current));
        prop_assert_eq!(heap.root_degrees(), degrees_before);
        prop_assert_eq!(heap.into_sorted_vec(), contents_before);
    }

    #[test]
    fn test_clone_is_independent(
        values in prop::collection::vec(-100i32..100, 1..100),
        ops in prop::collection::vec(op_strategy(), 0..100),
    ) {
        let mut original = FibonacciHeap::new();
        for &v in &values {
            original.push(v);
        }
        original.pop().unwrap();
        let expected = original.clone().into_sorted_vec();

        let mut copy = original.clone();
        prop_assert!(copy.check_invariants().is_ok());
        prop_assert_eq!(copy.root_degrees(), original.root_degrees());

        let mut model = Model {
            live: copy.handles().map(|h| (h, *copy.get(&h).unwrap())).collect(),
        };
        for op in &ops {
            apply(&mut copy, &mut model, op)?;
        }

        prop_assert_eq!(original.len(), expected.len());
        prop_assert_eq!(original.into_sorted_vec(), expected);
    }

    #[test]
    fn test_merge_contains_both(
        left in prop::collection::vec(-100i32..100, 0..60),
        right in prop::collection::vec(-100i32..100, 0..60),
    ) {
        let mut heap1: FibonacciHeap<i32> = left.iter().copied().collect();
        let mut heap2: FibonacciHeap<i32> = right.iter().copied().collect();
        if !heap2.is_empty() {
            heap2.pop().unwrap();
        }
        let mut expected: Vec<_> = heap2.iter().copied().chain(left.iter().copied()).collect();
        expected.sort_unstable();

        heap1.merge(heap2);
        prop_assert!(heap1.check_invariants().is_ok());
        prop_assert_eq!(heap1.into_sorted_vec(), expected);
    }

    #[test]
    fn test_max_order_pops_non_increasing(values in prop::collection::vec(any::<i64>(), 0..200)) {
        let mut heap = FibonacciHeap::with_comparator(MaxOrder);
        heap.extend(values.iter().copied());
        let mut last = i64::MAX;
        while let Ok(v) = heap.pop() {
            prop_assert!(v <= last);
            last = v;
        }
    }
}
