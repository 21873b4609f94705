//! Execution engine.
//!
//! The runner walks the graph back from the terminal node to its source,
//! then executes the resulting chain either on one partition in the calling
//! thread ([`ExecMode::Sequential`]) or split across the session's worker pool
//! ([`ExecMode::Parallel`]). Adjacent stateless nodes are fused and applied to
//! each partition in a single pass. `GroupByKey` is the only barrier: all
//! partitions are scattered before any destination is gathered.
//!
//! The session's cancellation flag is checked before every stage and at the
//! start of every partition task; a cancelled run fails with
//! [`AnagramError::Cancelled`] and produces no output.

use crate::error::AnagramError;
use crate::metrics::MetricsCollector;
use crate::node::{DynOp, GatherFn, Node, ScatterFn};
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::session::Session;
use crate::shuffle::transpose;
use crate::type_token::{Partition, downcast_vec};
use anyhow::{Result, anyhow, bail};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    /// `None` uses the session's default partition count.
    Parallel { partitions: Option<usize> },
}

pub struct Runner {
    pub mode: ExecMode,
    session: Session,
}

impl Runner {
    #[must_use]
    pub fn new(session: &Session, mode: ExecMode) -> Self {
        Self {
            mode,
            session: session.clone(),
        }
    }

    /// Execute and flatten all result partitions.
    pub fn run_collect<T: 'static + Send + Sync + Clone>(&self, p: &Pipeline, terminal: NodeId) -> Result<Vec<T>> {
        Ok(self.run_partitions::<T>(p, terminal)?.into_iter().flatten().collect())
    }

    /// Execute and return the result still split by partition.
    pub fn run_partitions<T: 'static + Send + Sync + Clone>(
        &self,
        p: &Pipeline,
        terminal: NodeId,
    ) -> Result<Vec<Vec<T>>> {
        let chain = linearize(p, terminal)?;
        let metrics = p.metrics();
        if let Some(m) = &metrics {
            m.record_start();
        }

        let started = Instant::now();
        let parts = match self.mode {
            ExecMode::Sequential => self.exec(chain, 1, metrics.as_ref(), false)?,
            ExecMode::Parallel { partitions } => {
                let n = partitions.unwrap_or(self.session.partitions()).max(1);
                self.session
                    .install(|| self.exec(chain, n, metrics.as_ref(), true))?
            }
        };

        let out = parts
            .into_iter()
            .map(|part| downcast_vec::<T>(part, "terminal"))
            .collect::<Result<Vec<_>>>()?;

        let total: usize = out.iter().map(Vec::len).sum();
        if let Some(m) = &metrics {
            m.increment_counter("output_elements", total as u64);
            m.record_end();
        }
        debug!(
            mode = ?self.mode,
            partitions = out.len(),
            elements = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline executed"
        );
        Ok(out)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.session.is_cancelled() {
            return Err(AnagramError::Cancelled.into());
        }
        Ok(())
    }

    fn exec(
        &self,
        chain: Vec<Node>,
        partitions: usize,
        metrics: Option<&MetricsCollector>,
        parallel: bool,
    ) -> Result<Vec<Partition>> {
        let mut nodes = chain.into_iter().peekable();
        let Some(Node::Source { payload, vec_ops }) = nodes.next() else {
            bail!("plan must start with a source node");
        };

        self.check_cancelled()?;
        if let (Some(m), Some(len)) = (metrics, vec_ops.len(payload.as_ref())) {
            m.increment_counter("source_elements", len as u64);
        }
        let mut current: Vec<Partition> = if partitions <= 1 {
            vec![vec_ops.clone_any(payload.as_ref())?]
        } else {
            vec_ops.split(payload.as_ref(), partitions)?
        };
        debug!(partitions = current.len(), "source split");

        while let Some(node) = nodes.next() {
            self.check_cancelled()?;
            match node {
                Node::Stateless(mut ops) => {
                    while let Some(Node::Stateless(more)) = nodes.peek() {
                        ops.extend(more.iter().cloned());
                        nodes.next();
                    }
                    trace!(
                        ops = ?ops.iter().map(|o| o.name()).collect::<Vec<_>>(),
                        "fused stateless stage"
                    );
                    current = self.map_partitions(current, parallel, |part| fuse_stateless(&ops, part))?;
                }
                Node::GroupByKey { scatter, gather } => {
                    let (grouped, groups) = self.shuffle(current, partitions, &scatter, &gather, parallel)?;
                    if let Some(m) = metrics {
                        m.increment_counter("shuffle_groups", groups as u64);
                    }
                    current = grouped;
                }
                Node::Source { .. } => bail!("unexpected additional source in plan"),
            }
        }
        Ok(current)
    }

    /// Apply `f` to every partition, on the pool when `parallel`.
    fn map_partitions<F>(&self, parts: Vec<Partition>, parallel: bool, f: F) -> Result<Vec<Partition>>
    where
        F: Fn(Partition) -> Result<Partition> + Send + Sync,
    {
        let task = |part: Partition| {
            self.check_cancelled()?;
            f(part)
        };
        if parallel {
            parts.into_par_iter().map(task).collect()
        } else {
            parts.into_iter().map(task).collect()
        }
    }

    /// Scatter every partition by key hash, then gather each destination.
    fn shuffle(
        &self,
        parts: Vec<Partition>,
        partitions: usize,
        scatter: &ScatterFn,
        gather: &GatherFn,
        parallel: bool,
    ) -> Result<(Vec<Partition>, usize)> {
        let upstream = parts.len();
        let scatter_task = |part: Partition| {
            self.check_cancelled()?;
            scatter(part, partitions)
        };
        let rows: Vec<Vec<Partition>> = if parallel {
            parts.into_par_iter().map(scatter_task).collect::<Result<_>>()?
        } else {
            parts.into_iter().map(scatter_task).collect::<Result<_>>()?
        };

        // barrier: every upstream partition has been routed
        self.check_cancelled()?;
        let columns = transpose(rows);
        debug!(upstream, destinations = columns.len(), "shuffle barrier reached");

        let gather_task = |col: Vec<Partition>| {
            self.check_cancelled()?;
            gather(col)
        };
        let gathered: Vec<(Partition, usize)> = if parallel {
            columns.into_par_iter().map(gather_task).collect::<Result<_>>()?
        } else {
            columns.into_iter().map(gather_task).collect::<Result<_>>()?
        };

        let groups = gathered.iter().map(|(_, n)| n).sum();
        Ok((gathered.into_iter().map(|(p, _)| p).collect(), groups))
    }
}

fn fuse_stateless(ops: &[Arc<dyn DynOp>], input: Partition) -> Result<Partition> {
    ops.iter().try_fold(input, |acc, op| op.apply(acc))
}

/// Walk back from `terminal` to its source: terminal → … → source, reversed.
fn linearize(p: &Pipeline, terminal: NodeId) -> Result<Vec<Node>> {
    let (mut nodes, edges) = p.snapshot()?;
    let mut chain: Vec<Node> = Vec::new();
    let mut cur = terminal;
    loop {
        let n = nodes
            .remove(&cur)
            .ok_or_else(|| anyhow!("missing node {cur:?}"))?;
        trace!(node = cur.raw(), kind = n.kind(), "plan step");
        chain.push(n);
        match edges.iter().find(|(_, to)| *to == cur) {
            Some((from, _)) => cur = *from,
            None => break,
        }
    }
    chain.reverse();
    Ok(chain)
}
