use crate::metrics::MetricsCollector;
use crate::node::Node;
use crate::node_id::NodeId;
use crate::session::Session;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// The deferred computation graph for one run.
///
/// Stages attach nodes as they are chained; nothing executes until a collect
/// method is called. Clones share the same graph and session.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) inner: Arc<Mutex<PipelineInner>>,
    session: Session,
}

pub struct PipelineInner {
    pub next_id: u64,
    pub nodes: HashMap<NodeId, Node>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub metrics: Option<MetricsCollector>,
}

impl Pipeline {
    /// Create an empty graph bound to `session`.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PipelineInner {
                next_id: 0,
                nodes: HashMap::new(),
                edges: Vec::new(),
                metrics: None,
            })),
            session: session.clone(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn lock(&self) -> Result<MutexGuard<'_, PipelineInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("pipeline graph lock poisoned"))
    }

    pub(crate) fn insert_node(&self, node: Node) -> NodeId {
        // A poisoned graph only means a panic elsewhere; the map is still consistent.
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = NodeId::new(g.next_id);
        g.next_id += 1;
        g.nodes.insert(id, node);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.edges.push((from, to));
    }

    /// Snapshot the graph (nodes are cheap to clone).
    pub(crate) fn snapshot(&self) -> Result<(HashMap<NodeId, Node>, Vec<(NodeId, NodeId)>)> {
        let g = self.lock()?;
        Ok((g.nodes.clone(), g.edges.clone()))
    }

    /// Attach a metrics collector; the runner records into it.
    pub fn set_metrics(&self, metrics: MetricsCollector) {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.metrics = Some(metrics);
    }

    /// The attached metrics collector, if any.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsCollector> {
        let g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.metrics.clone()
    }

    /// Detach and return the metrics collector.
    pub fn take_metrics(&self) -> Option<MetricsCollector> {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.metrics.take()
    }

    /// Number of nodes attached so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.lock().map(|g| g.nodes.len()).unwrap_or(0)
    }
}
