use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A whole file could not be read or decoded. Callers count it as skipped and
/// move on to the next file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File discovery for a source failed as a whole.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("invalid glob pattern {pattern:?} under {}: {message}", root.display())]
    Pattern {
        root: PathBuf,
        pattern: String,
        message: String,
    },
    #[error("{0}")]
    Message(String),
}

/// A refresh was abandoned; the previously published snapshot stays in place.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("locate {source_name} files: {error}")]
    Locate {
        source_name: &'static str,
        #[source]
        error: LocateError,
    },
    #[error("cannot determine the start of the week for {0}")]
    WeekStart(String),
}
