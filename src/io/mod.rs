//! Input and output adapters.
//!
//! - [`text`] reads line-oriented input from a file, directory or glob.
//! - [`sink`] stages and atomically publishes rendered records.
//! - [`compression`] decompresses input transparently.
//! - [`glob`] resolves input locations to files.

pub mod compression;
pub mod glob;
pub mod sink;
pub mod text;

pub use sink::{RecordSink, SUCCESS_MARKER, TextDirSink, part_file_name};
pub use text::{TextRange, TextShards, TextVecOps, build_text_shards, read_text_lines, read_text_range, read_text_vec};
