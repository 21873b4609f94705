use crate::type_token::{Partition, VecOps};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// A stateless, per-partition transform.
pub trait DynOp: Send + Sync {
    fn apply(&self, input: Partition) -> Result<Partition>;

    /// Short label used in logs.
    fn name(&self) -> &'static str {
        "op"
    }
}

/// Route one upstream partition of `Vec<(K, V)>` into `n` destination buckets.
pub type ScatterFn = Arc<dyn Fn(Partition, usize) -> Result<Vec<Partition>> + Send + Sync>;

/// Group every bucket routed to one destination into `Vec<(K, Vec<V>)>`,
/// returning the grouped partition and its group count.
pub type GatherFn = Arc<dyn Fn(Vec<Partition>) -> Result<(Partition, usize)> + Send + Sync>;

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        vec_ops: Arc<dyn VecOps>,
    },
    Stateless(Vec<Arc<dyn DynOp>>),

    /// Hash shuffle: every upstream partition is scattered into `n` buckets by
    /// key hash, buckets are transposed, and each destination gathers locally.
    /// This is the only node that moves data across partitions.
    GroupByKey { scatter: ScatterFn, gather: GatherFn },
}

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Source { .. } => "source",
            Node::Stateless(_) => "stateless",
            Node::GroupByKey { .. } => "group_by_key",
        }
    }
}
