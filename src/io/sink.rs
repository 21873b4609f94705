//! Record sinks.
//!
//! A [`RecordSink`] receives the rendered records of a run partition by
//! partition and publishes them atomically: nothing is visible at the output
//! location until [`RecordSink::commit`] succeeds, and [`RecordSink::abort`]
//! leaves no trace.
//!
//! [`TextDirSink`] writes a directory of `part-NNNNN` files plus an empty
//! `_SUCCESS` marker. Records are staged in a hidden sibling directory of the
//! output and renamed into place on commit.

use crate::error::{AnagramError, AnagramResult};
use anyhow::{Context, anyhow};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Marker file written into a successfully committed output directory.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Name of the `i`-th part file.
#[must_use]
pub fn part_file_name(i: usize) -> String {
    format!("part-{i:05}")
}

/// Destination for the records of one run.
///
/// Call order is `prepare`, `write_partitions` (once), then `commit` or
/// `abort`. `abort` may be called at any point and more than once.
pub trait RecordSink: Send {
    /// Check the destination and set up staging. Runs before any pipeline work.
    fn prepare(&mut self) -> AnagramResult<()>;

    /// Stage `partitions`, one part per inner vector. Returns records written.
    fn write_partitions(&mut self, partitions: Vec<Vec<String>>) -> AnagramResult<usize>;

    /// Publish everything staged so far.
    fn commit(&mut self) -> AnagramResult<()>;

    /// Discard everything staged so far.
    fn abort(&mut self);
}

/// Directory-of-part-files sink.
pub struct TextDirSink {
    output: PathBuf,
    overwrite: bool,
    staging: Option<TempDir>,
}

impl TextDirSink {
    pub fn new(output: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            output: output.into(),
            overwrite,
            staging: None,
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    fn fail(&self, e: impl Into<anyhow::Error>) -> AnagramError {
        AnagramError::sink_write(&self.output, e)
    }

    fn check_destination(&self) -> AnagramResult<()> {
        if self.output.exists() && !self.overwrite {
            return Err(self.fail(anyhow!("output already exists")));
        }
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn remove_existing(&self) -> anyhow::Result<()> {
        let meta = match fs::symlink_metadata(&self.output) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let removed = if meta.is_dir() {
            fs::remove_dir_all(&self.output)
        } else {
            fs::remove_file(&self.output)
        };
        removed.with_context(|| format!("remove existing {}", self.output.display()))
    }
}

fn write_part(path: &Path, records: &[String]) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for r in records {
        w.write_all(r.as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

impl RecordSink for TextDirSink {
    fn prepare(&mut self) -> AnagramResult<()> {
        self.check_destination()?;
        let parent = self.parent_dir();
        fs::create_dir_all(&parent)
            .with_context(|| format!("mkdir -p {}", parent.display()))
            .map_err(|e| self.fail(e))?;
        let staging = tempfile::Builder::new()
            .prefix(".anagrams-staging-")
            .tempdir_in(&parent)
            .with_context(|| format!("create staging directory in {}", parent.display()))
            .map_err(|e| self.fail(e))?;
        debug!(staging = %staging.path().display(), "sink prepared");
        self.staging = Some(staging);
        Ok(())
    }

    fn write_partitions(&mut self, partitions: Vec<Vec<String>>) -> AnagramResult<usize> {
        let Some(staging) = &self.staging else {
            return Err(self.fail(anyhow!("sink is not prepared")));
        };
        let dir = staging.path();
        partitions
            .par_iter()
            .enumerate()
            .try_for_each(|(i, records)| write_part(&dir.join(part_file_name(i)), records))
            .map_err(|e| self.fail(e))?;

        let written = partitions.iter().map(Vec::len).sum();
        debug!(parts = partitions.len(), records = written, "partitions staged");
        Ok(written)
    }

    fn commit(&mut self) -> AnagramResult<()> {
        let Some(staging) = self.staging.take() else {
            return Err(self.fail(anyhow!("sink is not prepared")));
        };
        File::create(staging.path().join(SUCCESS_MARKER))
            .with_context(|| format!("create {SUCCESS_MARKER}"))
            .map_err(|e| self.fail(e))?;

        // the destination may have appeared while the pipeline ran
        self.check_destination()?;
        if self.overwrite {
            self.remove_existing().map_err(|e| self.fail(e))?;
        }

        let staged = staging.keep();
        if let Err(e) = fs::rename(&staged, &self.output) {
            if let Err(cleanup) = fs::remove_dir_all(&staged) {
                warn!(staging = %staged.display(), error = %cleanup, "staging cleanup failed");
            }
            return Err(self.fail(anyhow::Error::new(e).context("publish staged output")));
        }
        info!(output = %self.output.display(), "output committed");
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(staging) = self.staging.take() {
            let path = staging.path().to_path_buf();
            if let Err(e) = staging.close() {
                warn!(staging = %path.display(), error = %e, "staging cleanup failed");
            } else {
                debug!(staging = %path.display(), "sink aborted");
            }
        }
    }
}
