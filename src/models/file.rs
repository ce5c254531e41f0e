use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Usage attributed to one scanned log file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUsage {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub total_tokens: u64,
    pub records_skipped: usize,
}
