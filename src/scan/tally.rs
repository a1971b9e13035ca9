//! Per-run match counting.
//!
//! Two separate primitives: [`FileClaim`] guarantees a file is counted at most
//! once, [`MatchTally`] counts claimed files across the run.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::constants::QUORUM;

/// Number of distinct reference files in which the code was found.
#[derive(Debug, Default)]
pub struct MatchTally {
    count: AtomicUsize,
}

impl MatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more matching file and returns the new total.
    pub fn record(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn reached_quorum(&self) -> bool {
        self.count() >= QUORUM
    }
}

/// One-shot "already found" flag for a single reference file.
#[derive(Debug, Default)]
pub struct FileClaim {
    claimed: AtomicBool,
}

impl FileClaim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for exactly one caller, however many race.
    pub fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

/// Work done by one run, for logging and for checking early exit.
#[derive(Debug, Default)]
pub struct ScanStats {
    chunks: AtomicU64,
    lines: AtomicU64,
}

impl ScanStats {
    pub(crate) fn record_chunk(&self) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_line(&self) {
        self.lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Chunks whose scan was started.
    pub fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    /// Line-boundary polls, one per line read plus the final poll of each scan.
    pub fn lines(&self) -> u64 {
        self.lines.load(Ordering::Relaxed)
    }
}
