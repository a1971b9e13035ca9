// Centralized magic numbers & default values
use std::time::Duration;

pub const MIN_CODE_LEN: usize = 8;
pub const MAX_CODE_LEN: usize = 10;
/// Number of distinct reference files a code must appear in.
pub const QUORUM: usize = 2;

pub const DEFAULT_CHUNK_SIZE: u64 = 100 * 1024 * 1024;
/// Bytes appended to every non-final chunk so a code cut by the boundary is
/// still seen whole by the chunk on its left.
pub const CHUNK_OVERLAP: u64 = 10;
pub const DEFAULT_CHUNK_WORKERS: usize = 100;
pub const DEFAULT_FILE_WORKERS: usize = 16;
pub const MAX_LINE_LEN: usize = 1024 * 1024;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const _: () = assert!(CHUNK_OVERLAP as usize >= MAX_CODE_LEN);
