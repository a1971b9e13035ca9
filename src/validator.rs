//! Validation orchestrator: cache lookup, fan-out over reference files,
//! quorum decision.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, MAX_CODE_LEN, MIN_CODE_LEN};
use crate::error::{ConfigError, ScanError, ValidationError};
use crate::scan::worker::{self, RunState};
use crate::scan::{CancelToken, ReferenceFile, ScanOptions};

/// Construction parameters for a [`Validator`].
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    pub scan: ScanOptions,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            scan: ScanOptions::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.scan.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.scan.chunk_workers == 0 {
            return Err(ConfigError::ZeroWorkers("chunk workers"));
        }
        if self.scan.file_workers == 0 {
            return Err(ConfigError::ZeroWorkers("file workers"));
        }
        Ok(())
    }
}

/// Coupon code validator.
///
/// Owns the outcome cache and the current reference-file set. A code is valid
/// when at least two distinct reference files contain it as a whole line.
/// Positive outcomes and clean negatives are cached; runs that hit I/O errors
/// or were cancelled by the caller are not.
pub struct Validator {
    cache: Cache<String, bool>,
    reference_files: RwLock<Arc<[ReferenceFile]>>,
    scan: ScanOptions,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity as u64)
            .time_to_live(config.cache_ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Ok(Self {
            cache,
            reference_files: RwLock::new(Arc::from(Vec::new())),
            scan: config.scan,
        })
    }

    /// Replaces the reference-file set. Runs already in flight keep the
    /// snapshot they started with.
    ///
    /// Paths naming the same file are collapsed to the first occurrence, so
    /// one file cannot count twice towards the quorum. Paths that cannot be
    /// canonicalized are compared as given.
    pub fn set_reference_files<P: Into<PathBuf>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) {
        let mut seen = HashSet::new();
        let files: Arc<[ReferenceFile]> = paths
            .into_iter()
            .map(Into::into)
            .filter(|path: &PathBuf| {
                seen.insert(dunce::canonicalize(path).unwrap_or_else(|_| path.clone()))
            })
            .map(ReferenceFile::new)
            .collect();
        debug!("using {} reference file(s)", files.len());
        *self
            .reference_files
            .write()
            .unwrap_or_else(PoisonError::into_inner) = files;
    }

    pub fn reference_files(&self) -> Arc<[ReferenceFile]> {
        Arc::clone(
            &self
                .reference_files
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Number of memoized outcomes, after pending evictions are applied.
    pub fn cache_len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }

    /// Decides whether `code` appears in at least two reference files.
    ///
    /// Codes outside the accepted length window are rejected without touching
    /// the cache or any file. Raising `cancel` stops every scan of the run; if
    /// that happens before quorum the call fails with
    /// [`ValidationError::Cancelled`].
    pub fn validate(
        &self,
        cancel: &CancelToken,
        code: &str,
    ) -> Result<bool, ValidationError> {
        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len()) {
            warn!("invalid coupon code length: {}", code.len());
            return Ok(false);
        }
        if let Some(valid) = self.cache.get(code) {
            debug!("cache hit for {code}: {valid}");
            return Ok(valid);
        }

        let started = Instant::now();
        let files = self.reference_files();
        let run = RunState::new(cancel.child());
        let errors = self.scan_all(&files, code, &run);
        debug!(
            "{code}: scanned {} chunk(s), polled {} line(s)",
            run.stats.chunks(),
            run.stats.lines()
        );

        if run.tally.reached_quorum() {
            info!("{code} valid after {:?}", started.elapsed());
            self.cache.insert(code.to_string(), true);
            return Ok(true);
        }
        if cancel.is_cancelled() {
            info!("{code} cancelled after {:?}", started.elapsed());
            return Err(ValidationError::Cancelled);
        }
        if !errors.is_empty() {
            let err = ValidationError::Scan(errors);
            warn!("{code} undecided: {err}");
            return Err(err);
        }
        info!(
            "{code} invalid after {:?} ({} matching file(s))",
            started.elapsed(),
            run.tally.count()
        );
        self.cache.insert(code.to_string(), false);
        Ok(false)
    }

    /// Runs a bounded pool of file workers over `files` and returns the
    /// errors they reported, drained after every worker has joined.
    fn scan_all(
        &self,
        files: &[ReferenceFile],
        code: &str,
        run: &RunState,
    ) -> Vec<ScanError> {
        if files.is_empty() {
            return Vec::new();
        }
        let (file_tx, file_rx) = crossbeam_channel::bounded::<&ReferenceFile>(files.len());
        let (err_tx, err_rx) = crossbeam_channel::bounded::<ScanError>(files.len());
        for file in files {
            if file_tx.send(file).is_err() {
                break;
            }
        }
        drop(file_tx);

        let workers = self.scan.file_workers.clamp(1, files.len());
        thread::scope(|s| {
            for _ in 0..workers {
                let rx = file_rx.clone();
                let err_tx = err_tx.clone();
                s.spawn(move || {
                    for file in rx.iter() {
                        if run.cancel.is_cancelled() {
                            break;
                        }
                        if let Err(e) = worker::scan_file(file, code, run, &self.scan) {
                            // At most one error per file, so this never blocks.
                            let _ = err_tx.send(e);
                        }
                    }
                });
            }
        });
        drop(err_tx);

        err_rx.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_validator(
        cache_capacity: usize,
        cache_ttl: Duration,
    ) -> Validator {
        Validator::new(ValidatorConfig {
            cache_capacity,
            cache_ttl,
            scan: ScanOptions::default(),
        })
        .unwrap()
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut config = ValidatorConfig::default();
        config.scan.chunk_size = 0;
        assert!(matches!(
            Validator::new(config).err(),
            Some(ConfigError::ZeroChunkSize)
        ));

        let mut config = ValidatorConfig::default();
        config.scan.file_workers = 0;
        assert!(matches!(
            Validator::new(config).err(),
            Some(ConfigError::ZeroWorkers(_))
        ));
    }

    #[test]
    fn empty_reference_set_is_a_clean_negative() {
        let v = Validator::new(ValidatorConfig::default()).unwrap();
        assert!(!v.validate(&CancelToken::new(), "SAVE2024").unwrap());
        assert_eq!(v.cache_len(), 1);
    }

    #[test]
    fn length_window_is_inclusive() {
        let v = Validator::new(ValidatorConfig::default()).unwrap();
        v.set_reference_files(["/no/such/file.txt"]);
        let token = CancelToken::new();
        // 7 and 11 bytes never reach the files
        assert!(!v.validate(&token, "ABCDEFG").unwrap());
        assert!(!v.validate(&token, "ABCDEFGHIJK").unwrap());
        // 8 and 10 bytes do, and fail on the missing file
        assert!(v.validate(&token, "ABCDEFGH").is_err());
        assert!(v.validate(&token, "ABCDEFGHIJ").is_err());
        assert_eq!(v.cache_len(), 0);
    }

    #[test]
    fn least_recently_used_outcome_is_evicted() {
        let v = empty_validator(2, DEFAULT_CACHE_TTL);
        let token = CancelToken::new();
        v.validate(&token, "AAAA0001").unwrap();
        v.validate(&token, "AAAA0002").unwrap();
        v.cache.run_pending_tasks();

        // a hit makes AAAA0001 the most recent entry
        v.validate(&token, "AAAA0001").unwrap();
        v.cache.run_pending_tasks();
        v.validate(&token, "AAAA0003").unwrap();
        v.cache.run_pending_tasks();

        assert!(v.cache.contains_key("AAAA0001"));
        assert!(!v.cache.contains_key("AAAA0002"));
        assert!(v.cache.contains_key("AAAA0003"));
        assert_eq!(v.cache_len(), 2);
    }

    #[test]
    fn outcomes_expire_after_ttl() {
        let v = empty_validator(8, Duration::from_millis(20));
        v.validate(&CancelToken::new(), "SAVE2024").unwrap();
        assert_eq!(v.cache.get("SAVE2024"), Some(false));

        thread::sleep(Duration::from_millis(80));
        assert_eq!(v.cache.get("SAVE2024"), None);
        assert_eq!(v.cache_len(), 0);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let v = empty_validator(0, DEFAULT_CACHE_TTL);
        v.validate(&CancelToken::new(), "SAVE2024").unwrap();
        assert_eq!(v.cache_len(), 0);
    }

    #[test]
    fn concurrent_runs_never_exceed_capacity() {
        let v = empty_validator(4, DEFAULT_CACHE_TTL);
        thread::scope(|s| {
            for t in 0..4 {
                let v = &v;
                s.spawn(move || {
                    let token = CancelToken::new();
                    for i in 0..25 {
                        assert!(!v.validate(&token, &format!("CODE{t}{i:03}")).unwrap());
                    }
                });
            }
        });
        assert!(v.cache_len() <= 4, "{}", v.cache_len());
    }

    #[test]
    fn same_file_listed_twice_is_scanned_once() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "SAVE2024\n")?;
        std::fs::write(&b, "OTHER123\n")?;

        let v = empty_validator(8, DEFAULT_CACHE_TTL);
        v.set_reference_files([a.clone(), a.clone(), dir.path().join(".").join("a.txt"), b]);
        assert_eq!(v.reference_files().len(), 2);
        assert_eq!(v.reference_files()[0].path, a);
        assert!(!v.validate(&CancelToken::new(), "SAVE2024")?);
        Ok(())
    }
}
