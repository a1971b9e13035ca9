//! Error types for reference-file scanning and validation.

use std::io;
use std::path::PathBuf;

/// Failure while scanning a single reference file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot open reference file {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot stat reference file {path:?}: {source}")]
    Metadata { path: PathBuf, source: io::Error },

    #[error("gzip stream in {path:?} is corrupt: {source}")]
    Decompress { path: PathBuf, source: io::Error },

    /// I/O failure in the middle of a sequential scan.
    #[error("read error in {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// I/O failure in the middle of a chunk scan.
    #[error("read error in {path:?} [{start}-{end}]: {source}")]
    ChunkRead {
        path: PathBuf,
        start: u64,
        end: u64,
        source: io::Error,
    },

    #[error("line longer than {limit} bytes in {path:?}")]
    LineTooLong { path: PathBuf, limit: usize },
}

/// Failure of a whole validation run. Never cached.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{} reference file(s) could not be scanned: {}", .0.len(), join_errors(.0))]
    Scan(Vec<ScanError>),

    #[error("validation cancelled before quorum was reached")]
    Cancelled,
}

/// Invalid validator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("{0} must be greater than zero")]
    ZeroWorkers(&'static str),
}

fn join_errors(errors: &[ScanError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
