//! # anagrams
//!
//! Groups the words of a large text corpus by anagram class and counts every
//! form, keeping only classes with at least two distinct words.
//!
//! The work runs on a small batch engine: a deferred pipeline graph of
//! partitioned collections, executed sequentially or across a rayon worker
//! pool owned by an explicit [`Session`].
//!
//! ```text
//! line source ─▶ Normalize ─▶ group_by_key (hash shuffle) ─▶ count ─▶ keep ─▶ record sink
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use anagrams::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = JobConfig::new(3, "corpus/*.txt", "out")?;
//! let job = AnagramJob::new(config);
//! let summary = Session::scope(Session::builder(), |session| {
//!     let mut sink = job.text_sink();
//!     Ok(job.run(session, &mut sink)?)
//! })?;
//! println!("{} anagram groups", summary.records_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Session
//!
//! A [`Session`] is the execution context of a run: it owns the worker pool,
//! the default partition count and the cancellation flag. It is created by
//! the caller, handed to [`Pipeline::new`], and closed when the run ends.
//!
//! ### Pipeline and PCollection
//!
//! A [`Pipeline`] holds the graph; a [`PCollection<T>`] is a typed handle to
//! one of its nodes. Transforms are lazy and nothing runs until a collect
//! method is called.
//!
//! - Element-wise: [`map`](PCollection::map), [`filter`](PCollection::filter),
//!   [`flat_map`](PCollection::flat_map)
//! - Keyed: [`key_by`](PCollection::key_by), [`map_values`](PCollection::map_values),
//!   [`filter_values`](PCollection::filter_values),
//!   [`group_by_key`](PCollection::group_by_key)
//!
//! `group_by_key` is the only barrier. It hashes each key to a destination
//! partition and every destination groups its pairs locally; no map is
//! shared between workers.
//!
//! ### Execution Modes
//!
//! - **Sequential**: [`collect_seq()`](PCollection::collect_seq), one partition, in order.
//! - **Parallel**: [`collect_par()`](PCollection::collect_par) and
//!   [`collect()`](PCollection::collect), on the session pool.
//!
//! Both produce the same multiset of results.
//!
//! ## I/O
//!
//! - [`read_text_lines`] reads a file, directory or glob as partitioned lines,
//!   decompressing `.gz` input transparently.
//! - [`TextDirSink`] stages `part-NNNNN` files and publishes them atomically.
//!
//! ## Errors
//!
//! Job-level failures are an [`AnagramError`]: configuration, source read,
//! sink write, cancellation, or an internal plan error.

pub mod anagram;
pub mod collection;
pub mod config;
pub mod error;
pub mod helpers;
pub mod io;
pub mod metrics;
pub mod node;
pub mod node_id;
pub mod pipeline;
pub mod runner;
pub mod session;
pub mod shuffle;
pub mod testing;
pub mod type_token;

// Re-exports
pub use anagram::{
    AnagramJob, CanonicalKey, FrequencyMap, Normalize, ResultEntry, RunSummary, Token, count, keep,
};
pub use collection::{PCollection, RFBound};
pub use config::JobConfig;
pub use error::{AnagramError, AnagramResult};
pub use helpers::*;
pub use io::{RecordSink, TextDirSink, read_text_lines, read_text_vec};
pub use metrics::MetricsCollector;
pub use node_id::NodeId;
pub use pipeline::Pipeline;
pub use runner::{ExecMode, Runner};
pub use session::{Session, SessionBuilder};
pub use type_token::Partition;
