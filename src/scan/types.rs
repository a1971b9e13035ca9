use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_WORKERS, DEFAULT_FILE_WORKERS};

/// How a reference file is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Gzip,
    PlainText,
}

impl FileFormat {
    /// `.gz` (any case) is gzip, everything else is read as plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => FileFormat::Gzip,
            _ => FileFormat::PlainText,
        }
    }
}

/// A reference file together with its detected format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    pub path: PathBuf,
    pub format: FileFormat,
}

impl ReferenceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self { path, format }
    }
}

/// Byte window `[start, end)` of a plain-text reference file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    pub(crate) fn len(&self) -> u64 {
        self.end - self.start
    }
}

/// Tuning knobs for the scanning worker tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub chunk_size: u64,
    /// Concurrent chunk scanners per plain-text file.
    pub chunk_workers: usize,
    /// Concurrent file workers per validation run.
    pub file_workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_workers: DEFAULT_CHUNK_WORKERS,
            file_workers: DEFAULT_FILE_WORKERS,
        }
    }
}
