//! Line-oriented text source.
//!
//! An input location (file, directory or glob) is resolved to a sorted list of
//! files, then cut into shards of at most `lines_per_shard` lines. Plain files
//! are sharded by byte offset so each shard can seek straight to its first
//! line; compressed files are read as a single shard. Shards are read in
//! parallel on the session pool when the pipeline runs.
//!
//! Every line is delivered exactly once, without its `\n` / `\r\n`
//! terminator. Input that is not valid UTF-8 is a read error, never a
//! silently dropped line.

use crate::error::AnagramError;
use crate::io::compression::{detect_codec, open_text_reader};
use crate::io::glob::resolve_input;
use crate::type_token::{Partition, VecOps};
use crate::{PCollection, Pipeline, from_custom_source};
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use std::any::Any;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One contiguous run of lines inside one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRange {
    /// Index into [`TextShards::files`].
    pub file: usize,
    /// Byte offset of the first line. Always 0 for compressed files.
    pub start_byte: u64,
    /// Number of lines in the range.
    pub lines: u64,
}

/// Sharding metadata for a text input, produced by [`build_text_shards`].
#[derive(Clone, Debug)]
pub struct TextShards {
    /// The original input location, used in error messages.
    pub location: String,
    pub files: Vec<PathBuf>,
    pub ranges: Vec<TextRange>,
    pub total_lines: u64,
}

fn read_error(path: &Path, e: impl Into<anyhow::Error>) -> anyhow::Error {
    AnagramError::source_read(path.display().to_string(), e).into()
}

/// Read one raw line including its terminator. Returns `None` at EOF.
fn next_raw_line(rdr: &mut impl BufRead, buf: &mut Vec<u8>) -> std::io::Result<Option<usize>> {
    buf.clear();
    let n = rdr.read_until(b'\n', buf)?;
    Ok((n > 0).then_some(n))
}

fn strip_terminator(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Count the lines of `path` and cut them into ranges.
fn shard_file(index: usize, path: &Path, lines_per_shard: u64) -> Result<(Vec<TextRange>, u64)> {
    let compressed = detect_codec(path)?.is_some();
    let mut rdr = open_text_reader(path)?;
    let mut buf = Vec::new();
    let mut ranges = Vec::new();
    let mut total: u64 = 0;
    let mut offset: u64 = 0;
    let mut range_start: u64 = 0;
    let mut in_range: u64 = 0;

    while let Some(n) = next_raw_line(&mut rdr, &mut buf)? {
        total += 1;
        in_range += 1;
        offset += n as u64;
        if !compressed && in_range == lines_per_shard {
            ranges.push(TextRange {
                file: index,
                start_byte: range_start,
                lines: in_range,
            });
            range_start = offset;
            in_range = 0;
        }
    }
    if in_range > 0 {
        ranges.push(TextRange {
            file: index,
            start_byte: range_start,
            lines: in_range,
        });
    }
    Ok((ranges, total))
}

/// Resolve `location` and build [`TextShards`] of at most `lines_per_shard` lines each.
///
/// Empty files contribute no ranges.
///
/// # Errors
/// Returns [`AnagramError::SourceRead`] if the location resolves to no files
/// or a file cannot be opened or read.
pub fn build_text_shards(location: &str, lines_per_shard: usize) -> Result<TextShards> {
    let files = resolve_input(location)
        .map_err(|e| AnagramError::source_read(location, e))?;
    let lps = lines_per_shard.max(1) as u64;

    let mut ranges = Vec::new();
    let mut total_lines = 0;
    for (i, path) in files.iter().enumerate() {
        let (file_ranges, lines) = shard_file(i, path, lps).map_err(|e| read_error(path, e))?;
        ranges.extend(file_ranges);
        total_lines += lines;
    }
    debug!(
        location,
        files = files.len(),
        shards = ranges.len(),
        total_lines,
        "text input sharded"
    );
    Ok(TextShards {
        location: location.to_string(),
        files,
        ranges,
        total_lines,
    })
}

/// Read the lines of one range.
///
/// # Errors
/// Returns [`AnagramError::SourceRead`] if the file cannot be read or a line
/// is not valid UTF-8.
pub fn read_text_range(src: &TextShards, range: &TextRange) -> Result<Vec<String>> {
    let path = src
        .files
        .get(range.file)
        .ok_or_else(|| anyhow!("range refers to unknown file #{}", range.file))?;
    read_range_from(path, range).map_err(|e| read_error(path, e))
}

fn read_range_from(path: &Path, range: &TextRange) -> Result<Vec<String>> {
    let mut rdr: Box<dyn BufRead + Send> = if range.start_byte == 0 {
        open_text_reader(path)?
    } else {
        let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        f.seek(SeekFrom::Start(range.start_byte))
            .with_context(|| format!("seek {} to {}", path.display(), range.start_byte))?;
        Box::new(BufReader::new(f))
    };

    let mut out = Vec::with_capacity(range.lines as usize);
    let mut buf = Vec::new();
    let first_line = range.start_byte;
    for i in 0..range.lines {
        if next_raw_line(&mut rdr, &mut buf)?.is_none() {
            bail!(
                "file ended after {i} of {} lines from byte {first_line}; it changed while being read",
                range.lines
            );
        }
        strip_terminator(&mut buf);
        let line = String::from_utf8(std::mem::take(&mut buf)).with_context(|| {
            format!("line {} after byte {first_line} is not valid UTF-8", i + 1)
        })?;
        out.push(line);
    }
    Ok(out)
}

/// [`VecOps`] adapter reading [`TextShards`] as `Vec<String>` partitions.
///
/// `split` yields one partition per range regardless of the requested count;
/// the shuffle that follows redistributes by key anyway.
pub struct TextVecOps;

impl TextVecOps {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }

    fn shards<'a>(&self, data: &'a dyn Any) -> Result<&'a TextShards> {
        data.downcast_ref::<TextShards>()
            .ok_or_else(|| anyhow!("source payload is not TextShards"))
    }
}

impl VecOps for TextVecOps {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<TextShards>()
            .map(|s| s.total_lines as usize)
    }

    fn split(&self, data: &dyn Any, _n: usize) -> Result<Vec<Partition>> {
        let s = self.shards(data)?;
        if s.ranges.is_empty() {
            return Ok(vec![Box::new(Vec::<String>::new()) as Partition]);
        }
        s.ranges
            .par_iter()
            .map(|r| read_text_range(s, r).map(|v| Box::new(v) as Partition))
            .collect()
    }

    fn clone_any(&self, data: &dyn Any) -> Result<Partition> {
        let s = self.shards(data)?;
        let mut all = Vec::with_capacity(s.total_lines as usize);
        for r in &s.ranges {
            all.extend(read_text_range(s, r)?);
        }
        Ok(Box::new(all))
    }
}

/// Build a `PCollection<String>` of the lines at `location`.
///
/// Files are resolved and line-counted now; their contents are read when the
/// pipeline runs.
///
/// # Errors
/// Returns [`AnagramError::SourceRead`] if the input cannot be resolved or counted.
pub fn read_text_lines(
    p: &Pipeline,
    location: &str,
    lines_per_shard: usize,
) -> Result<PCollection<String>> {
    let shards = build_text_shards(location, lines_per_shard)?;
    Ok(from_custom_source::<String, _>(p, shards, TextVecOps::new()))
}

/// Read every line at `location` eagerly, in file order.
///
/// # Errors
/// Returns [`AnagramError::SourceRead`] if any file cannot be read.
pub fn read_text_vec(location: &str) -> Result<Vec<String>> {
    let shards = build_text_shards(location, usize::MAX)?;
    let mut out = Vec::with_capacity(shards.total_lines as usize);
    for r in &shards.ranges {
        out.extend(read_text_range(&shards, r)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn shards_cover_every_line_once() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("in.txt");
        let body: String = (0..25).map(|i| format!("line {i}\r\n")).collect();
        fs::write(&path, body)?;

        let shards = build_text_shards(path.to_str().unwrap(), 10)?;
        assert_eq!(shards.total_lines, 25);
        assert_eq!(shards.ranges.len(), 3);
        assert_eq!(shards.ranges[2].lines, 5);

        let lines: Vec<String> = shards
            .ranges
            .iter()
            .map(|r| read_text_range(&shards, r))
            .collect::<Result<Vec<_>>>()?
            .concat();
        let expected: Vec<String> = (0..25).map(|i| format!("line {i}")).collect();
        assert_eq!(lines, expected);
        Ok(())
    }

    #[test]
    fn last_line_without_newline_is_kept() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("in.txt");
        fs::write(&path, "a\n\nb")?;
        assert_eq!(read_text_vec(path.to_str().unwrap())?, vec!["a", "", "b"]);
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_a_read_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.txt");
        fs::write(&path, b"ok\n\xff\xfe\n")?;
        let err = read_text_vec(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnagramError>(),
            Some(AnagramError::SourceRead { .. })
        ));
        Ok(())
    }

    #[test]
    fn file_shrunk_after_sharding_is_a_read_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("in.txt");
        let body: String = (0..20).map(|i| format!("word{i}\n")).collect();
        fs::write(&path, body)?;

        let shards = build_text_shards(path.to_str().unwrap(), 100)?;
        assert_eq!(shards.ranges[0].lines, 20);
        fs::write(&path, "listen\nsilent\n")?;

        let err = read_text_range(&shards, &shards.ranges[0]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnagramError>(),
            Some(AnagramError::SourceRead { .. })
        ));
        assert!(format!("{err:#}").contains("2 of 20 lines"), "{err:#}");
        Ok(())
    }
}
