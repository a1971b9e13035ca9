use std::path::PathBuf;

use anyhow::{Result, anyhow};
use glob::glob;

/// Expands reference-file patterns into concrete paths.
///
/// Each pattern is tried as a glob; a pattern with no matches is kept as a
/// literal path so a missing file surfaces later as a scan error instead of
/// silently shrinking the reference set.
pub fn expand_reference_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();

    for p in patterns {
        // Normalize Windows path separators for glob patterns
        let pattern = p.replace('\\', "/");
        let matches =
            glob(&pattern).map_err(|e| anyhow!("Invalid glob pattern {}: {:?}", pattern, e))?;

        let mut has_match = false;
        for path_res in matches {
            let path = path_res?;
            if path.is_file() {
                has_match = true;
                expanded.push(path);
            }
        }
        if !has_match {
            expanded.push(PathBuf::from(p));
        }
    }

    // The same file listed twice would count twice towards the quorum.
    for path in &mut expanded {
        if let Ok(canon) = dunce::canonicalize(&*path) {
            *path = canon;
        }
    }
    expanded.sort();
    expanded.dedup();
    Ok(expanded)
}
