use crate::cli::Cli;
use crate::reference::expand_reference_paths;
use crate::scan::ScanOptions;
use crate::validator::ValidatorConfig;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub codes: Vec<String>,
    /// Expanded, deduplicated reference files.
    pub reference_files: Vec<PathBuf>,
    pub verbose: bool,
    pub validator: ValidatorConfig,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let reference_files = expand_reference_paths(&cli.files)?;
        Ok(Config {
            codes: cli.codes,
            reference_files,
            verbose: cli.verbose,
            validator: ValidatorConfig {
                cache_capacity: cli.cache_size,
                cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
                scan: ScanOptions {
                    chunk_size: cli.chunk_size,
                    chunk_workers: cli.chunk_workers,
                    file_workers: cli.file_workers,
                },
            },
        })
    }

    /// True when codes should be read from stdin.
    pub fn codes_from_stdin(&self) -> bool {
        self.codes.len() == 1 && self.codes[0] == "-"
    }
}
