//! Test helpers shipped with the library.
//!
//! - **Assertions**: order-insensitive comparison of pipeline outputs.
//! - **Fixtures**: the canonical three-line corpus and a generated one.
//! - **Mock I/O**: [`VecSink`], an in-memory [`RecordSink`](crate::io::RecordSink),
//!   plus helpers to lay out input files and read committed output.
//!
//! ```no_run
//! use anagrams::*;
//! use anagrams::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let session = Session::builder().partitions(4).build()?;
//! let p = Pipeline::new(&session);
//! let job = AnagramJob::new(JobConfig::new(3, "unused", "unused")?);
//! let entries = job.build(from_vec(&p, anagram_corpus())).collect()?;
//! assert_entries_render_to(&entries, &anagram_corpus_expected());
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
