use crate::node::{GatherFn, Node, ScatterFn};
use crate::shuffle::{group_local, scatter};
use crate::type_token::downcast_vec;
use crate::{PCollection, Partition, RFBound};
use std::hash::Hash;
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Derive a key and produce (K, T)
    pub fn key_by<K, F>(self, key_fn: F) -> PCollection<(K, T)>
    where
        K: RFBound + Eq + Hash,
        F: 'static + Send + Sync + Fn(&T) -> K,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }
}

impl<K: RFBound + Eq + Hash, V: RFBound> PCollection<(K, V)> {
    /// Group values by key: (K, V) -> (K, Vec<V>)
    ///
    /// This is a barrier. No group is produced until every upstream partition
    /// has been scattered, and each key appears in exactly one output group.
    /// Value order inside a group is unspecified.
    pub fn group_by_key(self) -> PCollection<(K, Vec<V>)> {
        // typed closures, so the runner never needs to know K or V
        let scatter_fn: ScatterFn = Arc::new(|p: Partition, n: usize| -> anyhow::Result<Vec<Partition>> {
            let kv = downcast_vec::<(K, V)>(p, "group_by_key scatter")?;
            Ok(scatter(kv, n)
                .into_iter()
                .map(|bucket| Box::new(bucket) as Partition)
                .collect())
        });

        let gather_fn: GatherFn = Arc::new(|buckets: Vec<Partition>| -> anyhow::Result<(Partition, usize)> {
            let buckets = buckets
                .into_iter()
                .map(|b| downcast_vec::<(K, V)>(b, "group_by_key gather"))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let groups: Vec<(K, Vec<V>)> = group_local(buckets);
            let n = groups.len();
            Ok((Box::new(groups) as Partition, n))
        });

        let id = self.pipeline.insert_node(Node::GroupByKey {
            scatter: scatter_fn,
            gather: gather_fn,
        });
        self.pipeline.connect(self.id, id);
        PCollection::attach(self.pipeline, id)
    }
}
