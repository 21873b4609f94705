//! Tests for the `anagrams` binary: argument validation and exit codes.

use anagrams::testing::*;
use std::process::Command;

fn anagrams_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_anagrams"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_success_exits_zero_and_writes_output() -> anyhow::Result<()> {
    let input = write_input_files(&[("corpus.txt", anagram_corpus().as_slice())])?;
    let out_root = tempfile::tempdir()?;
    let output = out_root.path().join("out");
    let metrics = out_root.path().join("metrics.json");

    let status = anagrams_cmd()
        .arg("3")
        .arg(input.path())
        .arg(&output)
        .args(["--partitions", "2", "--threads", "2", "--metrics"])
        .arg(&metrics)
        .status()?;
    assert!(status.success());

    let mut records = read_output_records(&output)?;
    records.sort();
    let mut expected = anagram_corpus_expected();
    expected.sort_unstable();
    assert_eq!(records, expected);

    let m: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&metrics)?)?;
    assert_eq!(m["records_written"], 5);
    Ok(())
}

#[test]
fn test_bad_min_len_exits_nonzero_without_output() -> anyhow::Result<()> {
    let input = write_input_files(&[("corpus.txt", anagram_corpus().as_slice())])?;
    let out_root = tempfile::tempdir()?;
    let output = out_root.path().join("out");

    for n in ["abc", "0", "-1"] {
        let status = anagrams_cmd().arg(n).arg(input.path()).arg(&output).status()?;
        assert_eq!(status.code(), Some(2), "N = {n}");
    }
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_wrong_argument_count_exits_nonzero() -> anyhow::Result<()> {
    let status = anagrams_cmd().arg("3").arg("only-input").status()?;
    assert!(!status.success());
    Ok(())
}

#[test]
fn test_existing_output_exits_nonzero() -> anyhow::Result<()> {
    let input = write_input_files(&[("corpus.txt", anagram_corpus().as_slice())])?;
    let out_root = tempfile::tempdir()?;

    let status = anagrams_cmd()
        .arg("3")
        .arg(input.path())
        .arg(out_root.path())
        .status()?;
    assert_eq!(status.code(), Some(4));
    Ok(())
}
