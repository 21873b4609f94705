//! Input location resolution.
//!
//! An input location may be a single file, a directory, or a glob pattern.
//! Resolution always yields files in sorted order so shard numbering is
//! deterministic for a given input.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether `location` contains glob metacharacters.
#[must_use]
pub fn is_glob_pattern(location: &str) -> bool {
    location.contains(['*', '?', '['])
}

/// Expand a glob pattern into a sorted vector of matching regular files.
///
/// # Errors
/// Returns an error if the pattern is invalid or a matched entry cannot be
/// read. Zero matches is not an error here.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// List the data files of a directory, skipping hidden (`.`) and marker (`_`) entries.
///
/// # Errors
/// Returns an error if the directory cannot be listed.
pub fn list_dir_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// Resolve an input location to the files it names.
///
/// # Errors
/// Returns an error if nothing exists at `location`, or if it resolves to no files.
pub fn resolve_input(location: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(location);
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        list_dir_files(path)?
    } else if is_glob_pattern(location) {
        expand_glob(location)?
    } else {
        bail!("input path does not exist: {location}");
    };

    if files.is_empty() {
        bail!("no input files found at: {location}");
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_skips_markers_and_hidden_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.txt"), "x")?;
        fs::write(dir.path().join("a.txt"), "x")?;
        fs::write(dir.path().join("_SUCCESS"), "")?;
        fs::write(dir.path().join(".a.txt.crc"), "")?;
        fs::create_dir(dir.path().join("nested"))?;

        let files = resolve_input(dir.path().to_str().unwrap())?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        Ok(())
    }

    #[test]
    fn missing_and_empty_locations_fail() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(resolve_input(dir.path().join("nope.txt").to_str().unwrap()).is_err());
        assert!(resolve_input(dir.path().to_str().unwrap()).is_err());
        let pattern = format!("{}/*.txt", dir.path().display());
        assert!(resolve_input(&pattern).is_err());
        Ok(())
    }

    #[test]
    fn glob_matches_sorted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("2.txt"), "x")?;
        fs::write(dir.path().join("1.txt"), "x")?;
        fs::write(dir.path().join("1.log"), "x")?;
        let pattern = format!("{}/*.txt", dir.path().display());
        let files = resolve_input(&pattern)?;
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
        Ok(())
    }
}
