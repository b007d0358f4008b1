//! Property-based tests for AvlTreeMap.
//!
//! These tests check the map laws through the public API only,
//! using `std::collections::BTreeMap` as the reference model.

use std::collections::BTreeMap;
use std::ops::Bound;

use avlmap::{AvlTreeMap, KeyNotFoundError};
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_entries(max_size: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-500..500i32, any::<i32>()), 0..max_size)
}

fn arbitrary_bound() -> impl Strategy<Value = Bound<i32>> {
    prop_oneof![
        (-600..600i32).prop_map(Bound::Included),
        (-600..600i32).prop_map(Bound::Excluded),
        Just(Bound::Unbounded),
    ]
}

/// Largest height an AVL tree with `len` nodes can reach.
fn max_avl_height(len: usize) -> usize {
    let (mut nodes, mut prev_nodes, mut height) = (0usize, 0usize, 0usize);
    while nodes <= len {
        let next = nodes + prev_nodes + 1;
        prev_nodes = nodes;
        nodes = next;
        height += 1;
    }
    height - 1
}

fn valid_range(start: Bound<i32>, end: Bound<i32>) -> bool {
    match (start, end) {
        (Bound::Excluded(s), Bound::Excluded(e)) => s < e,
        (Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e)) => s <= e,
        _ => true,
    }
}

// =============================================================================
// Get-Insert Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(entries in arbitrary_entries(64), key: i32, value: i32) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.insert(key, value);
        prop_assert_eq!(map.get(&key), Some(&value));
        prop_assert_eq!(map.try_get(&key), Ok(&value));
    }

    /// Law: insert does not affect other keys.
    #[test]
    fn prop_get_insert_other_law(entries in arbitrary_entries(64), key1: i32, key2: i32, value: i32) {
        prop_assume!(key1 != key2);
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut updated = map.clone();
        updated.insert(key1, value);
        prop_assert_eq!(updated.get(&key2), map.get(&key2));
    }

    /// Law: insert returns the previous value, like the model.
    #[test]
    fn prop_insert_returns_previous(entries in arbitrary_entries(64), key in -500..500i32, value: i32) {
        let mut map: AvlTreeMap<i32, i32> = entries.iter().copied().collect();
        let mut model: BTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert_eq!(map.insert(key, value), model.insert(key, value));
    }
}

// =============================================================================
// Remove Laws
// =============================================================================

proptest! {
    /// Law: find after remove returns the end.
    #[test]
    fn prop_find_remove_law(entries in arbitrary_entries(64), key in -500..500i32) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.remove(&key);
        prop_assert!(map.find(&key).is_end());
        prop_assert_eq!(map.find(&key), map.cursor_end());
        prop_assert_eq!(map.count(&key), 0);
        prop_assert_eq!(map.try_get(&key), Err(KeyNotFoundError));
    }

    /// Law: removing an absent key changes nothing.
    #[test]
    fn prop_remove_absent_law(entries in arbitrary_entries(64), key in -500..500i32) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        map.remove(&key);
        let before = map.clone();
        prop_assert_eq!(map.remove(&key), None);
        prop_assert_eq!(map.len(), before.len());
        prop_assert!(map.iter().eq(before.iter()));
    }

    /// Law: remove does not affect other keys.
    #[test]
    fn prop_get_remove_other_law(entries in arbitrary_entries(64), key1 in -500..500i32, key2 in -500..500i32) {
        prop_assume!(key1 != key2);
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut removed = map.clone();
        removed.remove(&key1);
        prop_assert_eq!(removed.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Shape and Order Laws
// =============================================================================

proptest! {
    /// Law: ascending traversal yields strictly increasing keys.
    #[test]
    fn prop_ordering_law(entries in arbitrary_entries(128)) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let keys: Vec<i32> = map.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Law: the size equals the number of traversed entries and the number of distinct keys.
    #[test]
    fn prop_size_law(entries in arbitrary_entries(128)) {
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert_eq!(map.len(), map.iter().count());
        prop_assert_eq!(map.len(), model.len());
        prop_assert_eq!(map.is_empty(), model.is_empty());
        prop_assert!(map.iter().eq(model.iter()));
    }

    /// Law: the tree never grows higher than an AVL tree of its size can be.
    #[test]
    fn prop_height_law(entries in arbitrary_entries(256), removals in prop::collection::vec(-500..500i32, 0..128)) {
        let mut map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert!(map.height() <= max_avl_height(map.len()));
        for key in removals {
            map.remove(&key);
            prop_assert!(map.height() <= max_avl_height(map.len()));
        }
    }

    /// Law: walking a cursor backwards from the end visits the reverse traversal.
    #[test]
    fn prop_cursor_reverse_law(entries in arbitrary_entries(64)) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut cursor = map.cursor_end();
        let mut keys = Vec::new();
        loop {
            cursor.move_prev();
            match cursor.key() {
                Some(key) => keys.push(*key),
                None => break,
            }
        }
        let expected: Vec<i32> = map.keys().rev().copied().collect();
        prop_assert_eq!(keys, expected);
    }

    /// Law: a clone is equal to its source and independent of it.
    #[test]
    fn prop_clone_law(entries in arbitrary_entries(64), key in -500..500i32) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let mut copy = map.clone();
        prop_assert_eq!(&copy, &map);
        let before: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        copy.remove(&key);
        copy.insert(key + 1_000, 0);
        let after: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
    }
}

// =============================================================================
// Range Laws
// =============================================================================

proptest! {
    /// Law: range yields what the model yields, in both directions.
    #[test]
    fn prop_range_law(entries in arbitrary_entries(128), start in arbitrary_bound(), end in arbitrary_bound()) {
        prop_assume!(valid_range(start, end));
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert!(map.range((start, end)).eq(model.range((start, end))));
        prop_assert!(map.range((start, end)).rev().eq(model.range((start, end)).rev()));
    }

    /// Law: equal_range spans exactly the entry with the key, if any.
    #[test]
    fn prop_equal_range_law(entries in arbitrary_entries(64), key in -500..500i32) {
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        let (first, last) = map.equal_range(&key);
        let mut span = Vec::new();
        let mut cursor = first;
        while cursor != last {
            span.push(*cursor.key().unwrap());
            cursor.move_next();
        }
        let expected: Vec<i32> = map.get(&key).map(|_| key).into_iter().collect();
        prop_assert_eq!(span, expected);
        prop_assert_eq!(map.count(&key), usize::from(map.contains_key(&key)));
    }

    /// Law: the owning iterator yields the entries in order.
    #[test]
    fn prop_into_iter_law(entries in arbitrary_entries(64)) {
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map: AvlTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert!(map.into_iter().eq(model.into_iter()));
    }
}
