//! Identifier for nodes within a [`Pipeline`](crate::pipeline::Pipeline) graph.
//!
//! Ids are handed out sequentially as stages are attached, so a smaller id was
//! always attached earlier. The runner uses them only to walk the graph.

/// Unique numeric identifier for a node in a pipeline graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(v: u64) -> Self {
        Self(v)
    }

    /// Return the underlying numeric value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}
