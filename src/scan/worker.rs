//! Per-file scanning: sequential for gzip, chunked and parallel for plain text.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::thread;

use crossbeam_channel::Receiver;
use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

use crate::constants::{CHUNK_OVERLAP, MAX_LINE_LEN, QUORUM};
use crate::error::ScanError;
use crate::scan::cancel::CancelToken;
use crate::scan::chunker::{self, LineError, LineOutcome, LineWindow};
use crate::scan::tally::{FileClaim, MatchTally, ScanStats};
use crate::scan::types::{Chunk, FileFormat, ReferenceFile, ScanOptions};

const GZIP_READ_BUFFER: usize = 64 * 1024;

/// State shared by every task of one validation run.
#[derive(Debug)]
pub struct RunState {
    pub tally: MatchTally,
    pub cancel: CancelToken,
    pub stats: ScanStats,
}

impl RunState {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            tally: MatchTally::new(),
            cancel,
            stats: ScanStats::default(),
        }
    }

    // Called only by the winner of a file's claim.
    fn record_match(
        &self,
        path: &Path,
    ) {
        let total = self.tally.record();
        debug!("match #{total} in {}", path.display());
        if total >= QUORUM {
            self.cancel.cancel();
        }
    }

    fn should_stop(
        &self,
        claim: &FileClaim,
    ) -> bool {
        claim.is_claimed() || self.cancel.is_cancelled()
    }

    fn poll_line(
        &self,
        claim: &FileClaim,
    ) -> bool {
        self.stats.record_line();
        self.should_stop(claim)
    }
}

/// Scans one reference file, counting at most one match for it in `run`.
///
/// Returns `Ok(())` when the file matched, was exhausted, or the run was
/// cancelled. Errors are only reported when the file did not match.
pub fn scan_file(
    file: &ReferenceFile,
    code: &str,
    run: &RunState,
    options: &ScanOptions,
) -> Result<(), ScanError> {
    if run.cancel.is_cancelled() {
        return Ok(());
    }
    debug!("scanning {:?} file {}", file.format, file.path.display());
    let claim = FileClaim::new();
    match file.format {
        FileFormat::Gzip => scan_gzip(&file.path, code, &claim, run),
        FileFormat::PlainText => scan_plain_text(&file.path, code, &claim, run, options),
    }
}

fn scan_gzip(
    path: &Path,
    code: &str,
    claim: &FileClaim,
    run: &RunState,
) -> Result<(), ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::with_capacity(GZIP_READ_BUFFER, MultiGzDecoder::new(file));

    let window = LineWindow::default();
    match chunker::scan_lines(&mut reader, code.as_bytes(), window, || run.poll_line(claim)) {
        Ok(LineOutcome::Found) => {
            if claim.claim() {
                run.record_match(path);
            }
            Ok(())
        }
        Ok(LineOutcome::Stopped) => {
            debug!("stopped scanning {}", path.display());
            Ok(())
        }
        Ok(LineOutcome::Exhausted) => Ok(()),
        Err(LineError::Io(source)) => Err(classify_gzip_error(path, source)),
        Err(LineError::TooLong) => Err(ScanError::LineTooLong {
            path: path.to_path_buf(),
            limit: MAX_LINE_LEN,
        }),
    }
}

// flate2 reports bad headers, corrupt deflate data and truncated members
// with these kinds.
fn classify_gzip_error(
    path: &Path,
    source: io::Error,
) -> ScanError {
    match source.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            ScanError::Decompress {
                path: path.to_path_buf(),
                source,
            }
        }
        _ => ScanError::Read {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn scan_plain_text(
    path: &Path,
    code: &str,
    claim: &FileClaim,
    run: &RunState,
    options: &ScanOptions,
) -> Result<(), ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file
        .metadata()
        .map_err(|source| ScanError::Metadata {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    drop(file);

    let chunks = chunker::plan_chunks(size, options.chunk_size, CHUNK_OVERLAP);
    let workers = options.chunk_workers.clamp(1, chunks.len());
    let (chunk_tx, chunk_rx) = crossbeam_channel::bounded::<Chunk>(chunks.len());
    for chunk in chunks {
        if chunk_tx.send(chunk).is_err() {
            break;
        }
    }
    // Workers exit once the queue is drained.
    drop(chunk_tx);

    let mut errors: Vec<ScanError> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = chunk_rx.clone();
                s.spawn(move || drain_chunks(path, code, &rx, claim, run))
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    if claim.is_claimed() || errors.is_empty() {
        return Ok(());
    }
    for extra in errors.iter().skip(1) {
        warn!("{extra}");
    }
    Err(errors.swap_remove(0))
}

fn drain_chunks(
    path: &Path,
    code: &str,
    chunks: &Receiver<Chunk>,
    claim: &FileClaim,
    run: &RunState,
) -> Vec<ScanError> {
    let mut errors = Vec::new();
    for chunk in chunks.iter() {
        if run.should_stop(claim) {
            break;
        }
        debug!("starting chunk {}-{} of {}", chunk.start, chunk.end, path.display());
        run.stats.record_chunk();
        match chunker::scan_chunk(path, chunk, code, || run.poll_line(claim)) {
            Ok(true) => {
                if claim.claim() {
                    run.record_match(path);
                }
                break;
            }
            Ok(false) => {}
            Err(e) => errors.push(e),
        }
    }
    errors
}
