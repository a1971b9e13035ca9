// Chunk planning and the per-chunk line scanner
use crate::constants::MAX_LINE_LEN;
use crate::error::ScanError;
use crate::scan::types::Chunk;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const READ_BUFFER: usize = 64 * 1024;

/// Splits `file_size` bytes into windows of `chunk_size` bytes.
///
/// Every chunk but the last is widened by `overlap` bytes (clamped to EOF), so
/// a code that starts just before a boundary lies wholly inside the left
/// window. The last chunk ends exactly at `file_size`. An empty file yields one empty chunk.
pub fn plan_chunks(
    file_size: u64,
    chunk_size: u64,
    overlap: u64,
) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let count = file_size.div_ceil(chunk_size).max(1);
    (0..count)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i + 1 == count {
                file_size
            } else {
                start
                    .saturating_add(chunk_size)
                    .saturating_add(overlap)
                    .min(file_size)
            };
            Chunk { start, end }
        })
        .collect()
}

/// How a line scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineOutcome {
    Found,
    Stopped,
    Exhausted,
}

#[derive(Debug)]
pub(crate) enum LineError {
    Io(io::Error),
    TooLong,
}

impl From<io::Error> for LineError {
    fn from(e: io::Error) -> Self {
        LineError::Io(e)
    }
}

/// Which lines of a reader belong to the current scan.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LineWindow {
    /// The reader starts mid-line; that fragment belongs to the previous chunk.
    pub(crate) skip_first: bool,
    /// Only lines starting before this many bytes are compared. Such a line is
    /// read to its end even past the limit.
    pub(crate) starts_before: Option<u64>,
}

/// Reads `reader` line by line until a whole trimmed line equals `code`.
///
/// `should_stop` is polled before every line.
pub(crate) fn scan_lines<R: BufRead>(
    reader: &mut R,
    code: &[u8],
    window: LineWindow,
    should_stop: impl Fn() -> bool,
) -> Result<LineOutcome, LineError> {
    let mut line = Vec::with_capacity(256);
    let mut consumed = 0u64;
    let mut skip = window.skip_first;
    loop {
        if should_stop() {
            return Ok(LineOutcome::Stopped);
        }
        if window.starts_before.is_some_and(|limit| consumed >= limit) {
            return Ok(LineOutcome::Exhausted);
        }
        line.clear();
        let n = reader
            .by_ref()
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok(LineOutcome::Exhausted);
        }
        if line.len() > MAX_LINE_LEN && line.last() != Some(&b'\n') {
            return Err(LineError::TooLong);
        }
        consumed += n as u64;
        if std::mem::take(&mut skip) {
            continue;
        }
        if line.trim_ascii() == code {
            return Ok(LineOutcome::Found);
        }
    }
}

/// Scans the lines that start inside one byte window of a plain-text file
/// for an exact match.
///
/// A line cut by the window start is left to the chunk on the left. A line
/// cut by the window end is read to its newline, so only whole lines are
/// ever compared. Returns `Ok(false)` both when the window is exhausted and
/// when `should_stop` fired first.
pub fn scan_chunk(
    path: &Path,
    chunk: Chunk,
    code: &str,
    should_stop: impl Fn() -> bool,
) -> Result<bool, ScanError> {
    let read_error = |source: io::Error| ScanError::ChunkRead {
        path: path.to_path_buf(),
        start: chunk.start,
        end: chunk.end,
        source,
    };

    let mut file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let skip_first = if chunk.start > 0 {
        file.seek(SeekFrom::Start(chunk.start - 1)).map_err(read_error)?;
        let mut prev = [0u8; 1];
        file.read_exact(&mut prev).map_err(read_error)?;
        prev[0] != b'\n'
    } else {
        false
    };
    file.seek(SeekFrom::Start(chunk.start)).map_err(read_error)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER, file);
    let window = LineWindow {
        skip_first,
        starts_before: Some(chunk.len()),
    };

    match scan_lines(&mut reader, code.as_bytes(), window, should_stop) {
        Ok(outcome) => Ok(outcome == LineOutcome::Found),
        Err(LineError::Io(source)) => Err(read_error(source)),
        Err(LineError::TooLong) => Err(ScanError::LineTooLong {
            path: path.to_path_buf(),
            limit: MAX_LINE_LEN,
        }),
    }
}
