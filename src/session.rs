//! Explicit execution context for pipeline runs.
//!
//! A [`Session`] owns the worker thread pool, the default partition count and
//! a cancellation flag. It is created by the entry point, handed to
//! [`Pipeline::new`](crate::Pipeline::new), and closed when the run is over,
//! either explicitly with [`Session::close`], by [`Session::scope`], or on drop.
//!
//! ```no_run
//! use anagrams::session::{Session, SessionBuilder};
//!
//! let words = Session::scope(SessionBuilder::default().threads(4), |session| {
//!     let p = anagrams::Pipeline::new(session);
//!     anagrams::from_vec(&p, vec!["a".to_string()]).collect()
//! })?;
//! # anyhow::Result::<()>::Ok(())
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Builder for [`Session`].
#[derive(Clone, Debug, Default)]
pub struct SessionBuilder {
    threads: Option<usize>,
    partitions: Option<usize>,
}

impl SessionBuilder {
    /// Worker threads; defaults to rayon's choice (one per logical CPU).
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Default partition count for parallel collection.
    #[must_use]
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions.max(1));
        self
    }

    /// Build the thread pool and open the session.
    ///
    /// # Errors
    /// Returns an error if the thread pool cannot be created.
    pub fn build(self) -> Result<Session> {
        let mut pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("anagrams-worker-{i}"));
        if let Some(t) = self.threads {
            pool = pool.num_threads(t);
        }
        let pool = pool.build().context("build worker thread pool")?;
        let partitions = self
            .partitions
            .unwrap_or_else(|| 2 * num_cpus::get().max(2));
        let run_id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);

        info!(
            run_id,
            threads = pool.current_num_threads(),
            partitions,
            "session opened"
        );
        Ok(Session {
            inner: Arc::new(SessionInner {
                pool,
                partitions,
                run_id,
                cancelled: Arc::new(AtomicBool::new(false)),
                closed: AtomicBool::new(false),
            }),
        })
    }
}

struct SessionInner {
    pool: rayon::ThreadPool,
    partitions: usize,
    run_id: u64,
    cancelled: Arc<AtomicBool>,
    closed: AtomicBool,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(run_id = self.run_id, "session dropped without close");
        }
    }
}

/// Execution context shared by every pipeline built for one run.
///
/// Cloning is cheap; all clones refer to the same pool and flag.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Open a session, run `f` with it, and close it on every exit path.
    ///
    /// # Errors
    /// Returns the builder's error or whatever `f` returns.
    pub fn scope<R, F>(builder: SessionBuilder, f: F) -> Result<R>
    where
        F: FnOnce(&Session) -> Result<R>,
    {
        let session = builder.build()?;
        let out = f(&session);
        session.close();
        out
    }

    /// Run `op` inside this session's worker pool.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.inner.pool.install(op)
    }

    #[must_use]
    pub fn partitions(&self) -> usize {
        self.inner.partitions
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.inner.pool.current_num_threads()
    }

    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.inner.run_id
    }

    /// Request cancellation; running stages stop at their next check.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            info!(run_id = self.inner.run_id, "cancellation requested");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// The shared flag, for wiring to signal handlers.
    #[must_use]
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.inner.cancelled)
    }

    /// Close the session. Calling it more than once is a no-op.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            info!(run_id = self.inner.run_id, "session closed");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_closes_on_error() {
        let mut seen = None;
        let res: Result<()> = Session::scope(Session::builder().threads(1), |s| {
            seen = Some(s.clone());
            anyhow::bail!("boom")
        });
        assert!(res.is_err());
        assert!(seen.unwrap().is_closed());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let s = Session::builder().threads(1).partitions(3).build().unwrap();
        let other = s.clone();
        assert_eq!(other.partitions(), 3);
        s.cancel();
        assert!(other.is_cancelled());
        s.close();
        s.close();
        assert!(other.is_closed());
    }
}
