//! The anagram job driver.
//!
//! Composes the named units into a pipeline:
//!
//! ```text
//! lines ─ Normalize ─▶ (key, token) ─ group_by_key ─▶ (key, [token]) ─ count ─▶ (key, freq) ─ keep ─▶ ResultEntry
//! ```
//!
//! and runs it against a [`RecordSink`]. The sink is prepared before any
//! pipeline work, so an existing output fails fast; on any failure or
//! cancellation the sink is aborted and nothing is published.

use super::count::{FrequencyMap, count};
use super::keep::keep;
use super::record::ResultEntry;
use super::tokenize::{CanonicalKey, Normalize, Token};
use crate::config::JobConfig;
use crate::error::{AnagramError, AnagramResult};
use crate::io::sink::{RecordSink, TextDirSink};
use crate::io::text::read_text_lines;
use crate::metrics::MetricsCollector;
use crate::session::Session;
use crate::{PCollection, Pipeline};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub records_written: usize,
    /// Number of result partitions (one part file each for [`TextDirSink`]).
    pub partitions: usize,
    pub elapsed: Duration,
    pub metrics: MetricsCollector,
}

/// One configured anagram run.
pub struct AnagramJob {
    config: JobConfig,
    normalize: Normalize,
}

/// Map an engine failure onto the job-level taxonomy.
fn classify(e: anyhow::Error) -> AnagramError {
    match e.downcast::<AnagramError>() {
        Ok(err) => err,
        Err(e) => AnagramError::Plan(format!("{e:#}")),
    }
}

impl AnagramJob {
    #[must_use]
    pub fn new(config: JobConfig) -> Self {
        let normalize = Normalize::new(config.min_len);
        Self { config, normalize }
    }

    #[must_use]
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// A [`TextDirSink`] for the configured output and overwrite policy.
    #[must_use]
    pub fn text_sink(&self) -> TextDirSink {
        TextDirSink::new(&self.config.output, self.config.overwrite)
    }

    /// Attach the anagram stages downstream of `lines`.
    pub fn build(&self, lines: PCollection<String>) -> PCollection<ResultEntry> {
        let normalize = self.normalize;
        lines
            .flat_map(move |line: &String| normalize.apply(line))
            .group_by_key()
            .map_values(|words: &Vec<Token>| count(words))
            .filter_values(keep)
            .map(|(key, freq): &(CanonicalKey, FrequencyMap)| {
                ResultEntry::new(key.clone(), freq.clone())
            })
    }

    /// Read the configured input, compute the entries and publish them to `sink`.
    ///
    /// # Errors
    /// - [`AnagramError::SinkWrite`] if the sink cannot be prepared, staged or committed.
    /// - [`AnagramError::SourceRead`] if the input cannot be resolved or read.
    /// - [`AnagramError::Cancelled`] if the session was cancelled before commit.
    pub fn run(&self, session: &Session, sink: &mut dyn RecordSink) -> AnagramResult<RunSummary> {
        info!(
            run_id = session.run_id(),
            min_len = self.config.min_len,
            input = %self.config.input,
            output = %self.config.output.display(),
            "anagram run started"
        );
        sink.prepare()?;
        match self.execute(session, sink) {
            Ok(summary) => {
                info!(
                    records = summary.records_written,
                    partitions = summary.partitions,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "anagram run finished"
                );
                Ok(summary)
            }
            Err(e) => {
                sink.abort();
                if e.is_cancelled() {
                    warn!("anagram run cancelled; no output published");
                }
                Err(e)
            }
        }
    }

    fn ensure_running(session: &Session) -> AnagramResult<()> {
        if session.is_cancelled() {
            return Err(AnagramError::Cancelled);
        }
        Ok(())
    }

    fn execute(&self, session: &Session, sink: &mut dyn RecordSink) -> AnagramResult<RunSummary> {
        let started = Instant::now();
        Self::ensure_running(session)?;

        let p = Pipeline::new(session);
        let metrics = MetricsCollector::new();
        p.set_metrics(metrics.clone());

        let lines =
            read_text_lines(&p, &self.config.input, self.config.lines_per_shard).map_err(classify)?;
        let parts = self
            .build(lines)
            .map(ResultEntry::render)
            .collect_partitions(self.config.partitions)
            .map_err(classify)?;
        Self::ensure_running(session)?;

        let partitions = parts.len();
        let records_written = session.install(|| sink.write_partitions(parts))?;
        Self::ensure_running(session)?;
        sink.commit()?;

        metrics.set_counter("partitions", partitions as u64);
        metrics.set_counter("records_written", records_written as u64);
        Ok(RunSummary {
            records_written,
            partitions,
            elapsed: started.elapsed(),
            metrics,
        })
    }
}
