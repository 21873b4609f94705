//! Tests for job configuration, session lifecycle and metrics output.

use anagrams::*;
use std::sync::atomic::Ordering;

#[test]
fn test_config_from_three_arguments() -> anyhow::Result<()> {
    let c = JobConfig::from_args(&["3", "in/*.txt", "out"])?;
    assert_eq!(c.min_len, 3);
    assert_eq!(c.input, "in/*.txt");
    assert_eq!(c.output, std::path::PathBuf::from("out"));
    assert!(!c.overwrite);
    assert_eq!(c.partitions, None);
    Ok(())
}

#[test]
fn test_config_errors_are_configuration_errors() {
    let bad: [&[&str]; 6] = [
        &[],
        &["3", "in"],
        &["3", "in", "out", "extra"],
        &["three", "in", "out"],
        &["0", "in", "out"],
        &["-2", "in", "out"],
    ];
    for args in bad {
        let err = JobConfig::from_args(args).unwrap_err();
        assert!(matches!(err, AnagramError::Configuration(_)), "{args:?}: {err}");
        assert_eq!(err.exit_code(), 2);
    }
    assert!(JobConfig::from_args(&["2.5", "in", "out"]).is_err());
    assert!(JobConfig::new(1, "", "out").is_err());
}

#[test]
fn test_config_round_trips_through_json() -> anyhow::Result<()> {
    let c = JobConfig::new(4, "corpus", "out")?
        .with_partitions(Some(8))?
        .with_overwrite(true);
    let json = serde_json::to_string(&c)?;
    let back: JobConfig = serde_json::from_str(&json)?;
    assert_eq!(back, c);

    let minimal: JobConfig = serde_json::from_str(r#"{"min_len":2,"input":"a","output":"b"}"#)?;
    assert_eq!(minimal.lines_per_shard, anagrams::config::DEFAULT_LINES_PER_SHARD);
    Ok(())
}

#[test]
fn test_session_scope_closes_on_error() {
    let mut seen = None;
    let result: anyhow::Result<()> = Session::scope(Session::builder().threads(1), |s| {
        seen = Some(s.clone());
        anyhow::bail!("stage failed")
    });
    assert!(result.is_err());
    assert!(seen.expect("closure ran").is_closed());
}

#[test]
fn test_session_settings_and_cancellation_flag() -> anyhow::Result<()> {
    let s = Session::builder().threads(3).partitions(5).build()?;
    assert_eq!(s.threads(), 3);
    assert_eq!(s.partitions(), 5);
    assert!(!s.is_cancelled());

    // what a signal handler would do
    s.cancellation_flag().store(true, Ordering::SeqCst);
    assert!(s.is_cancelled());

    s.close();
    s.close();
    assert!(s.is_closed());

    let other = Session::builder().build()?;
    assert_ne!(other.run_id(), s.run_id());
    assert!(other.partitions() >= 4);
    Ok(())
}

#[test]
fn test_metrics_saved_as_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");

    let m = MetricsCollector::new();
    m.record_start();
    m.increment_counter("records_written", 5);
    m.record_end();
    m.save_to_file(&path)?;

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(v["records_written"], 5);
    assert!(v["execution_time_ms"].is_u64());
    Ok(())
}
