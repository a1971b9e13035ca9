use clap::Parser;
use clap::builder::RangedU64ValueParser;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_WORKERS,
    DEFAULT_FILE_WORKERS,
};

#[derive(Parser, Debug)]
#[command(name = "coupon-quorum", version)]
#[command(
    about = "Check coupon codes against reference files. A code is valid when at least \
             two reference files list it on a line of its own."
)]
pub struct Cli {
    /// Coupon codes to check; a single "-" reads one code per line from stdin.
    #[arg(required = true, num_args(1..))]
    pub codes: Vec<String>,

    /// Reference file path or glob (plain text, or gzip with a .gz suffix). Repeatable.
    #[arg(short = 'f', long = "files", required = true)]
    pub files: Vec<String>,

    /// Maximum number of cached validation outcomes.
    #[arg(short = 's', long = "cache-size", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_size: usize,

    /// Seconds a cached outcome stays valid.
    #[arg(long = "cache-ttl-secs", default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Bytes per chunk when scanning plain-text files in parallel.
    #[arg(
        short = 'c',
        long = "chunk-size",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub chunk_size: u64,

    /// Concurrent chunk scanners per plain-text file.
    #[arg(
        long = "chunk-workers",
        default_value_t = DEFAULT_CHUNK_WORKERS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub chunk_workers: usize,

    /// Reference files scanned concurrently.
    #[arg(
        long = "file-workers",
        default_value_t = DEFAULT_FILE_WORKERS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub file_workers: usize,

    /// Log scanning progress to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
