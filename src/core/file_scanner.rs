use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use tracing::warn;
use walkdir::WalkDir;

use crate::{core::error::ExtractError, utils::relative_path};

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Java files, sorted and deduplicated.
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

/// Collect `*.java` files under `includes` (relative to `root`), minus `ignores`.
///
/// Ignore globs are matched against the root-relative path. A literal include
/// that does not exist is an error; a glob include may match nothing.
pub fn scan_files(
    root: &Path,
    includes: &[String],
    ignore_patterns: &[String],
) -> Result<ScanResult, ExtractError> {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => warn!(pattern = %p, "invalid ignore pattern: {}", e),
            }
        } else {
            literal_ignore_paths.push(root.join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![root.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = root.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => {
                        let before = paths.len();
                        paths.extend(entries.flatten().filter(|entry| entry.is_dir()));
                        if paths.len() == before {
                            warn!(pattern = %inc, "include pattern matched no directories");
                        }
                    }
                    Err(e) => warn!(pattern = %inc, "invalid include pattern: {}", e),
                }
            } else {
                let path = root.join(inc);
                if !path.exists() {
                    return Err(ExtractError::MissingSourceRoot(path));
                }
                paths.push(path);
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn!("cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            let relative = relative_path(root, path);
            if glob_patterns.iter().any(|p| p.matches(&relative)) {
                continue;
            }

            if entry.file_type().is_file() && is_java_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    Ok(ScanResult {
        files,
        skipped_count,
    })
}

fn is_java_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("java")
}
