//! Error types surfaced by an anagram run.
//!
//! The engine internals work in `anyhow::Result` and attach context as they
//! go; the job layer classifies failures into [`AnagramError`] so callers can
//! tell a bad configuration from an unreadable source or an unwritable sink.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for job-level operations.
pub type AnagramResult<T> = Result<T, AnagramError>;

/// Failure taxonomy for a pipeline run.
#[derive(Error, Debug)]
pub enum AnagramError {
    /// Wrong argument count, unparseable or out-of-range minimum length.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The line source could not be resolved or read.
    #[error("cannot read input {location}: {source:#}")]
    SourceRead {
        location: String,
        #[source]
        source: anyhow::Error,
    },

    /// The record sink could not stage or publish the results.
    #[error("cannot write output {}: {source:#}", location.display())]
    SinkWrite {
        location: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The session was cancelled before the run completed.
    #[error("run cancelled")]
    Cancelled,

    /// Internal graph or type mismatch inside the engine.
    #[error("pipeline error: {0}")]
    Plan(String),
}

impl AnagramError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a source read error for `location`
    pub fn source_read(location: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::SourceRead {
            location: location.into(),
            source: source.into(),
        }
    }

    /// Create a sink write error for `location`
    pub fn sink_write(location: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::SinkWrite {
            location: location.into(),
            source: source.into(),
        }
    }

    /// Whether this error was caused by cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::SourceRead { .. } => 3,
            Self::SinkWrite { .. } => 4,
            Self::Cancelled => 130, // 128 + SIGINT
            Self::Plan(_) => 1,
        }
    }
}
