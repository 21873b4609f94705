//! Job configuration.
//!
//! A [`JobConfig`] is validated when it is built: every violation is reported
//! as [`AnagramError::Configuration`] before any pipeline work starts.

use crate::error::{AnagramError, AnagramResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of lines read into a single source partition.
pub const DEFAULT_LINES_PER_SHARD: usize = 10_000;

/// Validated settings for one anagram run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Words shorter than this (after trimming) are ignored. Always `>= 1`.
    pub min_len: usize,
    /// Input location: a file, a directory or a glob pattern.
    pub input: String,
    /// Output directory for result records.
    pub output: PathBuf,
    /// Partition count override; the session default is used when `None`.
    #[serde(default)]
    pub partitions: Option<usize>,
    /// Replace an existing output directory instead of failing.
    #[serde(default)]
    pub overwrite: bool,
    /// Lines per source shard.
    #[serde(default = "default_lines_per_shard")]
    pub lines_per_shard: usize,
}

fn default_lines_per_shard() -> usize {
    DEFAULT_LINES_PER_SHARD
}

impl JobConfig {
    /// Build a config from an already-parsed minimum length and the two locations.
    ///
    /// # Errors
    /// Returns [`AnagramError::Configuration`] if `min_len` is zero or a location is empty.
    pub fn new(min_len: usize, input: impl Into<String>, output: impl Into<PathBuf>) -> AnagramResult<Self> {
        if min_len < 1 {
            return Err(AnagramError::configuration(
                "minimum word length N must be at least 1",
            ));
        }
        let input = input.into();
        if input.trim().is_empty() {
            return Err(AnagramError::configuration("input location is empty"));
        }
        let output = output.into();
        if output.as_os_str().is_empty() {
            return Err(AnagramError::configuration("output location is empty"));
        }
        Ok(Self {
            min_len,
            input,
            output,
            partitions: None,
            overwrite: false,
            lines_per_shard: DEFAULT_LINES_PER_SHARD,
        })
    }

    /// Validate the three positional parameters `<N> <input> <output>`.
    ///
    /// # Errors
    /// Returns [`AnagramError::Configuration`] on a wrong argument count, a
    /// non-integer `N`, or `N < 1`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> AnagramResult<Self> {
        let [n, input, output] = args else {
            return Err(AnagramError::configuration(format!(
                "expected 3 arguments <N> <input-path> <output-path>, got {}",
                args.len()
            )));
        };
        let min_len = Self::parse_min_len(n.as_ref())?;
        Self::new(min_len, input.as_ref(), output.as_ref())
    }

    /// Parse the minimum word length `N`.
    ///
    /// # Errors
    /// Returns [`AnagramError::Configuration`] if `raw` is not an integer or is below 1.
    pub fn parse_min_len(raw: &str) -> AnagramResult<usize> {
        let n: i64 = raw
            .trim()
            .parse()
            .map_err(|_| AnagramError::configuration(format!("N must be an integer, got {raw:?}")))?;
        if n < 1 {
            return Err(AnagramError::configuration(format!(
                "N must be at least 1, got {n}"
            )));
        }
        usize::try_from(n)
            .map_err(|_| AnagramError::configuration(format!("N is out of range: {n}")))
    }

    /// Override the partition count.
    ///
    /// # Errors
    /// Returns [`AnagramError::Configuration`] if `partitions` is zero.
    pub fn with_partitions(mut self, partitions: Option<usize>) -> AnagramResult<Self> {
        if partitions == Some(0) {
            return Err(AnagramError::configuration("partitions must be at least 1"));
        }
        self.partitions = partitions;
        Ok(self)
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn with_lines_per_shard(mut self, lines: usize) -> Self {
        self.lines_per_shard = lines.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_positionals() {
        let cfg = JobConfig::from_args(&["3", "in.txt", "out"]).unwrap();
        assert_eq!(cfg.min_len, 3);
        assert_eq!(cfg.input, "in.txt");
        assert_eq!(cfg.output, PathBuf::from("out"));
        assert!(!cfg.overwrite);
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = JobConfig::from_args(&["3", "in.txt"]).unwrap_err();
        assert!(matches!(err, AnagramError::Configuration(_)));
        let err = JobConfig::from_args(&["3", "a", "b", "c"]).unwrap_err();
        assert!(matches!(err, AnagramError::Configuration(_)));
    }

    #[test]
    fn rejects_bad_min_len() {
        for raw in ["x", "3.5", "", "0", "-2"] {
            let err = JobConfig::parse_min_len(raw).unwrap_err();
            assert!(matches!(err, AnagramError::Configuration(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_zero_partitions() {
        let cfg = JobConfig::new(2, "in", "out").unwrap();
        assert!(cfg.clone().with_partitions(Some(0)).is_err());
        assert_eq!(cfg.with_partitions(Some(4)).unwrap().partitions, Some(4));
    }
}
