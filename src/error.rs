//! Fatal errors of a counting run.
//!
//! Malformed lines are not represented here: they are counted and skipped
//! inside the ingestion loop (see [`crate::address::MalformedAddress`]).
use std::path::PathBuf;

/// Errors which abort a run before a report is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source file could not be opened
    #[error("failed to open {}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Archive directory could not be read or its member could not be opened
    #[error("failed to read archive {}", .path.display())]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// Source advertises no content at all
    #[error("source {name} is empty")]
    EmptySource { name: String },

    /// Underlying reader failed in the middle of the stream
    #[error("read failed after line {line}")]
    Read {
        /// Number of lines fully read before the failure
        line: u64,
        source: std::io::Error,
    },

    /// Line exceeds the configured length ceiling
    #[error("line {line} exceeds the {limit} byte limit")]
    LineTooLong { line: u64, limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
