//! Typed handles over the deferred pipeline graph.
//!
//! A [`PCollection<T>`] names one node of a [`Pipeline`]; chaining a transform
//! attaches a new node and returns a handle to it. The stateless operators
//! below are the [`DynOp`] implementations those transforms insert. Each one
//! downcasts its input partition, applies the user function element by
//! element, and boxes the result again.

use crate::node::DynOp;
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::type_token::{Partition, downcast_vec};
use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

/// Bound shared by every element type that flows through a pipeline.
pub trait RFBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> RFBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

/// A deferred, partitioned collection of `T`.
#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    pub(crate) _t: PhantomData<T>,
}

impl<T> PCollection<T> {
    pub(crate) fn attach(pipeline: Pipeline, id: NodeId) -> Self {
        Self {
            pipeline,
            id,
            _t: PhantomData,
        }
    }

    /// The pipeline this collection belongs to.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.id
    }
}

// ---- stateless operators ----

pub(crate) struct MapOp<I, O, F>(pub F, pub PhantomData<fn(&I) -> O>);
impl<I, O, F> DynOp for MapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<I>(input, "map")?;
        let out: Vec<O> = v.iter().map(|i| self.0(i)).collect();
        Ok(Box::new(out))
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

pub(crate) struct FilterOp<T, P>(pub P, pub PhantomData<fn(&T)>);
impl<T, P> DynOp for FilterOp<T, P>
where
    T: RFBound,
    P: Send + Sync + Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<T>(input, "filter")?;
        Ok(Box::new(v.into_iter().filter(|t| self.0(t)).collect::<Vec<T>>()))
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

/// Flat-map over a lazily produced iterator; outputs are drained straight
/// into the partition buffer.
pub(crate) struct FlatMapOp<I, O, It, F>(pub F, pub PhantomData<fn(&I) -> (It, O)>);
impl<I, O, It, F> DynOp for FlatMapOp<I, O, It, F>
where
    I: RFBound,
    O: RFBound,
    It: IntoIterator<Item = O>,
    F: Send + Sync + Fn(&I) -> It + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<I>(input, "flat_map")?;
        let mut out: Vec<O> = Vec::new();
        for i in &v {
            out.extend(self.0(i));
        }
        Ok(Box::new(out))
    }

    fn name(&self) -> &'static str {
        "flat_map"
    }
}

pub(crate) struct MapValuesOp<K, V, O, F>(pub F, pub PhantomData<fn(&K, &V) -> O>);
impl<K, V, O, F> DynOp for MapValuesOp<K, V, O, F>
where
    K: RFBound,
    V: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&V) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let kv = downcast_vec::<(K, V)>(input, "map_values")?;
        let out: Vec<(K, O)> = kv.into_iter().map(|(k, v)| (k, self.0(&v))).collect();
        Ok(Box::new(out))
    }

    fn name(&self) -> &'static str {
        "map_values"
    }
}

pub(crate) struct FilterValuesOp<K, V, P>(pub P, pub PhantomData<fn(&K, &V)>);
impl<K, V, P> DynOp for FilterValuesOp<K, V, P>
where
    K: RFBound,
    V: RFBound,
    P: Send + Sync + Fn(&V) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let kv = downcast_vec::<(K, V)>(input, "filter_values")?;
        Ok(Box::new(kv.into_iter().filter(|(_, v)| self.0(v)).collect::<Vec<(K, V)>>()))
    }

    fn name(&self) -> &'static str {
        "filter_values"
    }
}
