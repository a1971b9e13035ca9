#![allow(dead_code)]
use assert_fs::{TempDir, prelude::*};
use coupon_quorum::scan::ScanOptions;
use coupon_quorum::{Validator, ValidatorConfig};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Writes a plain-text reference file with one code per line.
pub fn plain(
    dir: &TempDir,
    name: &str,
    codes: &[&str],
) -> PathBuf {
    let child = dir.child(name);
    let mut body = codes.join("\n");
    body.push('\n');
    child.write_str(&body).unwrap();
    child.path().to_path_buf()
}

/// Writes a gzip-compressed reference file with one code per line.
pub fn gzip(
    dir: &TempDir,
    name: &str,
    codes: &[&str],
) -> PathBuf {
    let child = dir.child(name);
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    for code in codes {
        writeln!(enc, "{code}").unwrap();
    }
    child.write_binary(&enc.finish().unwrap()).unwrap();
    child.path().to_path_buf()
}

/// Validator with tiny chunks so even small fixtures span many of them.
pub fn small_validator() -> Validator {
    Validator::new(ValidatorConfig {
        cache_capacity: 64,
        cache_ttl: Duration::from_secs(3600),
        scan: ScanOptions {
            chunk_size: 16,
            chunk_workers: 4,
            file_workers: 4,
        },
    })
    .unwrap()
}
