//! Run metrics.
//!
//! A [`MetricsCollector`] is attached to a [`Pipeline`](crate::Pipeline) with
//! `set_metrics`. The runner adds `source_elements`, `shuffle_groups` and
//! `output_elements`; the anagram job adds `partitions` and
//! `records_written`. Counters can be logged, rendered as JSON or saved.
//!
//! ```no_run
//! use anagrams::*;
//! use anagrams::metrics::MetricsCollector;
//!
//! # fn main() -> anyhow::Result<()> {
//! let session = Session::builder().build()?;
//! let p = Pipeline::new(&session);
//! p.set_metrics(MetricsCollector::new());
//!
//! from_vec(&p, vec![1u32, 2, 3]).map(|x: &u32| x * 2).collect()?;
//!
//! if let Some(metrics) = p.take_metrics() {
//!     metrics.log();
//!     metrics.save_to_file("metrics.json")?;
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Thread-safe container of named counters plus run timing.
#[derive(Clone, Debug, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsCollectorInner>>,
}

#[derive(Debug, Default)]
struct MetricsCollectorInner {
    counters: BTreeMap<String, u64>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Counters stay meaningful after a panic in another holder, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, MetricsCollectorInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the start of execution. Only the first call counts.
    pub fn record_start(&self) {
        let mut inner = self.lock();
        if inner.start_time.is_none() {
            inner.start_time = Some(Instant::now());
        }
    }

    /// Record the end of execution. The latest call wins.
    pub fn record_end(&self) {
        self.lock().end_time = Some(Instant::now());
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        match (inner.start_time, inner.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Add `value` to the counter `name`, creating it at zero if missing.
    pub fn increment_counter(&self, name: &str, value: u64) {
        *self.lock().counters.entry(name.to_string()).or_insert(0) += value;
    }

    /// Set the counter `name` to `value`.
    pub fn set_counter(&self, name: &str, value: u64) {
        self.lock().counters.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.lock().counters.get(name).copied()
    }

    /// All counters, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.lock().counters.clone()
    }

    /// Counters plus `execution_time_ms` when timing is complete.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = serde_json::Map::new();
        for (name, value) in self.snapshot() {
            obj.insert(name, json!(value));
        }
        if let Some(elapsed) = self.elapsed() {
            obj.insert(
                "execution_time_ms".to_string(),
                json!(elapsed.as_millis() as u64),
            );
        }
        Value::Object(obj)
    }

    /// Emit every counter as one `info` event.
    pub fn log(&self) {
        for (name, value) in self.snapshot() {
            info!(metric = %name, value, "metric");
        }
        if let Some(elapsed) = self.elapsed() {
            info!(elapsed_ms = elapsed.as_millis() as u64, "execution time");
        }
    }

    /// Save [`to_json`](Self::to_json) as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_clones() {
        let m = MetricsCollector::new();
        let other = m.clone();
        m.increment_counter("records_written", 2);
        other.increment_counter("records_written", 3);
        m.set_counter("partitions", 4);
        assert_eq!(m.counter("records_written"), Some(5));
        assert_eq!(other.counter("partitions"), Some(4));
        assert_eq!(m.counter("missing"), None);
    }

    #[test]
    fn json_includes_timing_once_complete() {
        let m = MetricsCollector::new();
        m.increment_counter("shuffle_groups", 7);
        assert!(m.to_json().get("execution_time_ms").is_none());
        m.record_start();
        m.record_end();
        let v = m.to_json();
        assert_eq!(v["shuffle_groups"], json!(7));
        assert!(v.get("execution_time_ms").is_some());
    }
}
