//! Element-wise transforms and collection entry points.
//!
//! `map`, `filter` and `flat_map` insert a single stateless node each; the
//! runner fuses adjacent stateless nodes so a chain of them costs one pass per
//! partition.

use crate::collection::{FilterOp, FlatMapOp, MapOp};
use crate::node::{DynOp, Node};
use crate::runner::{ExecMode, Runner};
use crate::{PCollection, RFBound};
use std::marker::PhantomData;
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Attach a single stateless op downstream of this collection.
    pub(crate) fn push_stateless<O>(self, op: Arc<dyn DynOp>) -> PCollection<O> {
        let id = self.pipeline.insert_node(Node::Stateless(vec![op]));
        self.pipeline.connect(self.id, id);
        PCollection::attach(self.pipeline, id)
    }

    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> O,
    {
        self.push_stateless(Arc::new(MapOp::<T, O, F>(f, PhantomData)))
    }

    pub fn filter<F>(self, pred: F) -> PCollection<T>
    where
        F: 'static + Send + Sync + Fn(&T) -> bool,
    {
        self.push_stateless(Arc::new(FilterOp::<T, F>(pred, PhantomData)))
    }

    /// Expand each element into zero or more outputs.
    ///
    /// `f` may return any iterable, including a lazy iterator borrowing
    /// nothing from the input.
    pub fn flat_map<O, It, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        It: IntoIterator<Item = O> + 'static,
        F: 'static + Send + Sync + Fn(&T) -> It,
    {
        self.push_stateless(Arc::new(FlatMapOp::<T, O, It, F>(f, PhantomData)))
    }
}

impl<T: RFBound> PCollection<T> {
    /// Execute in parallel with the session's default partition count.
    pub fn collect(self) -> anyhow::Result<Vec<T>> {
        self.collect_par(None)
    }

    /// Execute on a single partition, in source order.
    pub fn collect_seq(self) -> anyhow::Result<Vec<T>> {
        Runner::new(self.pipeline.session(), ExecMode::Sequential)
            .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Execute on the session's worker pool with `partitions` partitions.
    pub fn collect_par(self, partitions: Option<usize>) -> anyhow::Result<Vec<T>> {
        Runner::new(self.pipeline.session(), ExecMode::Parallel { partitions })
            .run_collect::<T>(&self.pipeline, self.id)
    }

    /// Execute in parallel and keep the result split by partition.
    pub fn collect_partitions(self, partitions: Option<usize>) -> anyhow::Result<Vec<Vec<T>>> {
        Runner::new(self.pipeline.session(), ExecMode::Parallel { partitions })
            .run_partitions::<T>(&self.pipeline, self.id)
    }
}
