//! Assertions for pipeline outputs.
//!
//! Pipeline results come back in partition order, which depends on the
//! partition count and the key hash. These helpers compare without caring
//! about that order.

use crate::anagram::ResultEntry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

fn multiset<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut m = HashMap::new();
    for it in items {
        *m.entry(it).or_insert(0) += 1;
    }
    m
}

/// Assert that two collections hold the same elements with the same multiplicities.
///
/// # Panics
/// Panics, listing the missing and unexpected elements, if they differ.
///
/// # Example
///
/// ```
/// use anagrams::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 1, 2], &[1, 2, 3, 1]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let a = multiset(actual);
    let e = multiset(expected);
    if a != e {
        let missing: Vec<_> = e
            .iter()
            .filter(|(k, n)| a.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| *k)
            .collect();
        let extra: Vec<_> = a
            .iter()
            .filter(|(k, n)| e.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| *k)
            .collect();
        panic!(
            "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

/// Assert that two key/value collections are equal once sorted.
///
/// # Panics
/// Panics if they differ after sorting.
pub fn assert_kv_collections_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Ord + Debug,
    V: Ord + Debug,
{
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected, "Key-value collections differ (both sorted)");
}

/// Assert that every element satisfies `predicate`.
///
/// # Panics
/// Panics with the first offending element and its index.
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    if let Some((i, bad)) = collection.iter().enumerate().find(|(_, x)| !predicate(x)) {
        panic!("Element at index {i} does not satisfy predicate: {bad:?}");
    }
}

/// Assert that `actual` entries render to exactly the `expected` lines, in any order.
///
/// # Panics
/// Panics if the rendered sets differ.
pub fn assert_entries_render_to(actual: &[ResultEntry], expected: &[&str]) {
    let mut rendered: Vec<String> = actual.iter().map(ResultEntry::render).collect();
    let mut expected: Vec<String> = expected.iter().map(|s| (*s).to_string()).collect();
    rendered.sort();
    expected.sort();
    assert_eq!(rendered, expected, "Rendered entries differ (both sorted)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "Missing elements")]
    fn multiplicity_matters() {
        assert_collections_unordered_equal(&[1, 1, 2], &[1, 2, 2]);
    }

    #[test]
    fn kv_order_is_ignored() {
        assert_kv_collections_equal(vec![("b", 2), ("a", 1)], vec![("a", 1), ("b", 2)]);
    }
}
