//! # Sources Module
//!
//! Finds the log files behind each usage source.
//!
//! - Primary (Claude Code): every `*.jsonl` below the transcript root, recursively.
//! - Secondary (Claude Desktop): glob matches of each pattern under each candidate
//!   application-data root.
//!
//! A missing root is not an error, it simply yields no files. Entries that cannot be
//! read while walking are skipped. Symlinked files are included.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globwalk::{FileType, GlobWalkerBuilder};
use walkdir::WalkDir;

use crate::config::MonitorConfig;
use crate::error::LocateError;

const PRIMARY_EXTENSION: &str = ".jsonl";

/// Enumerates candidate files for both sources. No ordering is guaranteed.
pub trait FileLocator {
    fn primary_files(&self) -> Result<Vec<PathBuf>, LocateError>;
    fn secondary_files(&self) -> Result<Vec<PathBuf>, LocateError>;
}

/// Filesystem-backed locator driven by [`MonitorConfig`].
#[derive(Debug, Clone)]
pub struct FsLocator {
    primary_root: PathBuf,
    secondary_roots: Vec<PathBuf>,
    secondary_patterns: Vec<String>,
    dedupe_secondary: bool,
}

impl FsLocator {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            primary_root: config.primary_root.clone(),
            secondary_roots: config.secondary_roots.clone(),
            secondary_patterns: config.secondary_patterns.clone(),
            dedupe_secondary: config.dedupe_secondary,
        }
    }
}

impl FileLocator for FsLocator {
    fn primary_files(&self) -> Result<Vec<PathBuf>, LocateError> {
        Ok(primary_files_under(&self.primary_root))
    }

    fn secondary_files(&self) -> Result<Vec<PathBuf>, LocateError> {
        secondary_files_under(
            &self.secondary_roots,
            &self.secondary_patterns,
            self.dedupe_secondary,
        )
    }
}

/// All `*.jsonl` files below `root`.
pub fn primary_files_under(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        log::debug!("primary root {} not found", root.display());
        return Vec::new();
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::debug!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };
        // symlinked transcripts count; `path().is_file()` follows the link
        if !entry.path().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(PRIMARY_EXTENSION))
        {
            files.push(entry.into_path());
        }
    }
    files
}

/// Glob matches for every `(root, pattern)` pair.
///
/// Each pattern is walked on its own, so a file matched by two patterns is returned
/// twice unless `dedupe` is set, in which case files are kept once per canonical path.
pub fn secondary_files_under(
    roots: &[PathBuf],
    patterns: &[String],
    dedupe: bool,
) -> Result<Vec<PathBuf>, LocateError> {
    let mut files = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        for pattern in patterns {
            let walker = GlobWalkerBuilder::from_patterns(root, &[pattern.as_str()])
                .file_type(FileType::FILE)
                .follow_links(true)
                .build()
                .map_err(|e| LocateError::Pattern {
                    root: root.clone(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            for entry in walker {
                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        log::debug!("skipping unreadable entry under {}: {err}", root.display());
                        continue;
                    }
                };
                let path = entry.into_path();
                if dedupe {
                    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
                    if !seen.insert(key) {
                        continue;
                    }
                }
                files.push(path);
            }
        }
    }
    Ok(files)
}
