//! Anagram grouping.
//!
//! Each stage is a small named unit that can be tested on its own:
//! [`Normalize`] (line to key/token pairs), [`count`] (group to
//! [`FrequencyMap`]), [`keep`] (singleton filter) and [`ResultEntry`]
//! (rendering). [`AnagramJob`] wires them into a pipeline.

pub mod count;
pub mod job;
pub mod keep;
pub mod record;
pub mod tokenize;

pub use count::{FrequencyMap, count};
pub use job::{AnagramJob, RunSummary};
pub use keep::keep;
pub use record::ResultEntry;
pub use tokenize::{CanonicalKey, Normalize, Token, shorter_than, trim_trailing};
