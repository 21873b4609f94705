//! Hash shuffle primitives used by `group_by_key`.
//!
//! Grouping is partition-and-merge: each upstream partition routes its pairs
//! to a destination chosen by hashing the key, the per-destination buckets are
//! transposed, and each destination groups its own buckets with a local map.
//! No map is ever shared between workers, and equal keys always reach the same
//! destination, so one destination sees every value of the keys it owns.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Pick the destination partition for `key` among `n`.
///
/// Stable for a given build: the same key always lands on the same partition,
/// whichever upstream partition emitted it.
#[inline]
pub fn partition_for<K: Hash + ?Sized>(key: &K, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % n as u64) as usize
}

/// Route `pairs` into `n` buckets by key hash.
pub fn scatter<K: Hash, V>(pairs: Vec<(K, V)>, n: usize) -> Vec<Vec<(K, V)>> {
    let n = n.max(1);
    let mut buckets: Vec<Vec<(K, V)>> = (0..n).map(|_| Vec::new()).collect();
    for (k, v) in pairs {
        let dest = partition_for(&k, n);
        buckets[dest].push((k, v));
    }
    buckets
}

/// Turn `rows[upstream][destination]` into `columns[destination][upstream]`.
///
/// Rows shorter than the widest one contribute nothing to the missing columns.
pub fn transpose<T>(rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut cols: Vec<Vec<T>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        for (i, cell) in row.into_iter().enumerate() {
            cols[i].push(cell);
        }
    }
    cols
}

/// Group every bucket routed to one destination.
pub fn group_local<K: Hash + Eq, V>(buckets: impl IntoIterator<Item = Vec<(K, V)>>) -> Vec<(K, Vec<V>)> {
    let mut m: HashMap<K, Vec<V>> = HashMap::new();
    for bucket in buckets {
        for (k, v) in bucket {
            m.entry(k).or_default().push(v);
        }
    }
    m.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_share_a_destination() {
        for n in 1..16 {
            assert_eq!(partition_for("eilnst", n), partition_for(&"eilnst".to_string(), n));
            assert!(partition_for("amry", n) < n);
        }
    }

    #[test]
    fn scatter_then_group_keeps_every_value() {
        let up_a = vec![("k1", 1), ("k2", 2), ("k1", 3)];
        let up_b = vec![("k2", 4), ("k3", 5), ("k1", 6)];
        let rows = vec![scatter(up_a, 4), scatter(up_b, 4)];
        let cols = transpose(rows);
        assert_eq!(cols.len(), 4);

        let mut groups: Vec<(&str, Vec<i32>)> = cols
            .into_iter()
            .flat_map(|col| group_local(col))
            .map(|(k, mut vs)| {
                vs.sort_unstable();
                (k, vs)
            })
            .collect();
        groups.sort();
        assert_eq!(
            groups,
            vec![("k1", vec![1, 3, 6]), ("k2", vec![2, 4]), ("k3", vec![5])]
        );
    }

    #[test]
    fn transpose_handles_empty_input() {
        let cols: Vec<Vec<u8>> = transpose(Vec::new());
        assert!(cols.is_empty());
    }
}
