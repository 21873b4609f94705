//! Value-only transforms for keyed collections.
//!
//! These keep the key untouched, so a collection that is partitioned by key
//! after `group_by_key` stays partitioned by key.

use crate::collection::{FilterValuesOp, MapValuesOp};
use crate::{PCollection, RFBound};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

impl<K: RFBound + Eq + Hash, V: RFBound> PCollection<(K, V)> {
    /// Transform only the value component of each pair: (K, V) -> (K, O)
    pub fn map_values<O, F>(self, f: F) -> PCollection<(K, O)>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&V) -> O,
    {
        self.push_stateless(Arc::new(MapValuesOp::<K, V, O, F>(f, PhantomData)))
    }

    /// Keep only pairs whose value satisfies `pred`.
    pub fn filter_values<F>(self, pred: F) -> PCollection<(K, V)>
    where
        F: 'static + Send + Sync + Fn(&V) -> bool,
    {
        self.push_stateless(Arc::new(FilterValuesOp::<K, V, F>(pred, PhantomData)))
    }
}
