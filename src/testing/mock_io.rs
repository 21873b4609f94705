//! In-memory sinks and temporary input layouts.

use crate::error::{AnagramError, AnagramResult};
use crate::io::sink::RecordSink;
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Observable state of a [`VecSink`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecSinkState {
    pub prepared: bool,
    /// Records staged but not yet committed, by partition.
    pub staged: Vec<Vec<String>>,
    /// Records published by `commit`.
    pub committed: Vec<String>,
    pub commits: usize,
    pub aborts: usize,
}

/// A [`RecordSink`] keeping everything in memory.
///
/// Clones share state, so a test can keep one handle while the job owns
/// another. `fail_on_write` makes staging fail, to exercise the abort path.
#[derive(Clone, Default)]
pub struct VecSink {
    state: Arc<Mutex<VecSinkState>>,
    fail_on_write: bool,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `write_partitions` always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_on_write: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecSinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn state(&self) -> VecSinkState {
        self.lock().clone()
    }

    /// Committed records, sorted.
    #[must_use]
    pub fn committed_sorted(&self) -> Vec<String> {
        let mut v = self.lock().committed.clone();
        v.sort();
        v
    }
}

impl RecordSink for VecSink {
    fn prepare(&mut self) -> AnagramResult<()> {
        self.lock().prepared = true;
        Ok(())
    }

    fn write_partitions(&mut self, partitions: Vec<Vec<String>>) -> AnagramResult<usize> {
        if self.fail_on_write {
            return Err(AnagramError::sink_write("<memory>", anyhow!("injected write failure")));
        }
        let n = partitions.iter().map(Vec::len).sum();
        self.lock().staged = partitions;
        Ok(n)
    }

    fn commit(&mut self) -> AnagramResult<()> {
        let mut st = self.lock();
        let staged = std::mem::take(&mut st.staged);
        st.committed.extend(staged.into_iter().flatten());
        st.commits += 1;
        Ok(())
    }

    fn abort(&mut self) {
        let mut st = self.lock();
        st.staged.clear();
        st.aborts += 1;
    }
}

/// Write each `(relative path, lines)` pair under a fresh temporary directory.
///
/// Parent directories are created as needed; every line gets a trailing `\n`.
///
/// # Errors
/// Returns an error if the directory or any file cannot be created.
pub fn write_input_files(files: &[(&str, &[String])]) -> std::io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    for (name, lines) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = String::new();
        for l in *lines {
            body.push_str(l);
            body.push('\n');
        }
        fs::write(&path, body)?;
    }
    Ok(dir)
}

/// Read every part file of a committed output directory, in part order.
///
/// # Errors
/// Returns an error if the directory or a part file cannot be read.
pub fn read_output_records(output: &Path) -> std::io::Result<Vec<String>> {
    let mut parts: Vec<PathBuf> = fs::read_dir(output)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("part-"))
        })
        .collect();
    parts.sort();
    let mut out = Vec::new();
    for p in parts {
        out.extend(fs::read_to_string(&p)?.lines().map(str::to_string));
    }
    Ok(out)
}
