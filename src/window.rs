//! # Window Module
//!
//! Time-window aggregation over log files, keyed on file modification time.
//!
//! - `sum_since`: every file modified at or after a bound (the weekly total)
//! - `most_recent`: only the newest file (the session total)
//!
//! Unreadable files contribute nothing and are counted in `files_skipped`.

use chrono::{DateTime, Datelike, LocalResult, TimeDelta, TimeZone, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ParseError;
use crate::models::FileUsage;
use crate::parser::parse_file;

/// Summed usage over a set of files plus what had to be skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotal {
    pub total_tokens: u64,
    pub files_counted: usize,
    pub files_skipped: usize,
    pub records_skipped: usize,
}

impl WindowTotal {
    fn add_file(&mut self, usage: &FileUsage) {
        log::trace!("{}: {} tokens", usage.path.display(), usage.total_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total_tokens);
        self.files_counted += 1;
        self.records_skipped += usage.records_skipped;
    }

    fn skip_file(&mut self) {
        self.files_skipped += 1;
    }
}

/// Local midnight of the most recent Monday (Monday itself counts as day 0).
///
/// When midnight falls into a DST gap the first representable local time after it is
/// used. Returns `None` only if no such time exists within a few hours.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let days_back = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - TimeDelta::days(days_back);
    let midnight = monday.and_hms_opt(0, 0, 0)?;
    let tz = now.timezone();
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => (1..=12).find_map(|step| {
            tz.from_local_datetime(&(midnight + TimeDelta::minutes(15 * step)))
                .earliest()
        }),
    }
}

pub fn modified_at(path: &Path) -> io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}

/// Parse one file whose modification time is already known.
pub fn read_usage(path: &Path, modified_at: DateTime<Utc>) -> Result<FileUsage, ParseError> {
    let tally = parse_file(path)?;
    Ok(FileUsage {
        path: path.to_path_buf(),
        modified_at,
        total_tokens: tally.usage.total_tokens(),
        records_skipped: tally.records_skipped,
    })
}

/// Stat and parse one file.
pub fn scan_file(path: &Path) -> Result<FileUsage, ParseError> {
    let mtime = modified_at(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_usage(path, mtime)
}

/// Sum the usage of every file modified at or after `since`.
///
/// The result does not depend on the order of `files`.
pub fn sum_since(files: &[PathBuf], since: DateTime<Utc>) -> WindowTotal {
    let mut total = WindowTotal::default();
    for path in files {
        let mtime = match modified_at(path) {
            Ok(t) => t,
            Err(err) => {
                log::debug!("stat {}: {err}", path.display());
                total.skip_file();
                continue;
            }
        };
        if mtime < since {
            continue;
        }
        match read_usage(path, mtime) {
            Ok(usage) => total.add_file(&usage),
            Err(err) => {
                log::debug!("skipping {err}");
                total.skip_file();
            }
        }
    }
    total
}

/// The most recently modified file, ignoring files that cannot be stat'ed.
pub fn newest_file(files: &[PathBuf]) -> Option<(&Path, DateTime<Utc>)> {
    let mut dated: Vec<(&Path, DateTime<Utc>)> = files
        .iter()
        .filter_map(|p| modified_at(p).ok().map(|t| (p.as_path(), t)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    dated.into_iter().next()
}

/// Usage of the newest file only.
pub fn most_recent(files: &[PathBuf]) -> WindowTotal {
    let mut total = WindowTotal::default();
    let Some((path, _)) = newest_file(files) else {
        return total;
    };
    match scan_file(path) {
        Ok(usage) => total.add_file(&usage),
        Err(err) => {
            log::debug!("skipping {err}");
            total.skip_file();
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_week_start_midweek() {
        // Wednesday
        let start = week_start(&at(2025, 10, 15, 14, 30)).unwrap();
        assert_eq!(start, at(2025, 10, 13, 0, 0));
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_week_start_on_monday_and_sunday() {
        assert_eq!(
            week_start(&at(2025, 10, 13, 0, 0)).unwrap(),
            at(2025, 10, 13, 0, 0)
        );
        assert_eq!(
            week_start(&at(2025, 10, 19, 23, 59)).unwrap(),
            at(2025, 10, 13, 0, 0)
        );
        // Monday rollover moves the boundary
        assert_eq!(
            week_start(&at(2025, 10, 20, 0, 1)).unwrap(),
            at(2025, 10, 20, 0, 0)
        );
    }

    #[test]
    fn test_week_start_crosses_month_and_year() {
        // Thursday 2026-01-01 -> Monday 2025-12-29
        let start = week_start(&at(2026, 1, 1, 9, 0)).unwrap();
        assert_eq!(start, at(2025, 12, 29, 0, 0));
        assert_eq!(start.hour(), 0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(sum_since(&[], Utc::now()), WindowTotal::default());
        assert_eq!(most_recent(&[]), WindowTotal::default());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let ghost = vec![PathBuf::from("/definitely/not/here.jsonl")];
        let total = sum_since(&ghost, DateTime::<Utc>::MIN_UTC);
        assert_eq!(total.total_tokens, 0);
        assert_eq!(total.files_skipped, 1);
        assert_eq!(most_recent(&ghost), WindowTotal::default());
    }

    /// A zone that switches from `before` to `after` (seconds east of UTC) at
    /// 2025-10-13 00:00 UTC, a Monday.
    #[derive(Debug, Clone, Copy)]
    struct ShiftZone {
        before: i32,
        after: i32,
    }

    #[derive(Debug, Clone, Copy)]
    struct ShiftOffset {
        zone: ShiftZone,
        fixed: FixedOffset,
    }

    impl Offset for ShiftOffset {
        fn fix(&self) -> FixedOffset {
            self.fixed
        }
    }

    impl ShiftZone {
        fn transition() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2025, 10, 13)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        }

        fn offset(&self, secs: i32) -> ShiftOffset {
            ShiftOffset {
                zone: *self,
                fixed: FixedOffset::east_opt(secs).unwrap(),
            }
        }
    }

    impl TimeZone for ShiftZone {
        type Offset = ShiftOffset;

        fn from_offset(offset: &ShiftOffset) -> Self {
            offset.zone
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<ShiftOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<ShiftOffset> {
            let t = Self::transition();
            let before = *local - TimeDelta::seconds(self.before.into()) < t;
            let after = *local - TimeDelta::seconds(self.after.into()) >= t;
            match (before, after) {
                (true, true) => LocalResult::Ambiguous(self.offset(self.before), self.offset(self.after)),
                (true, false) => LocalResult::Single(self.offset(self.before)),
                (false, true) => LocalResult::Single(self.offset(self.after)),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> ShiftOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> ShiftOffset {
            if *utc < Self::transition() {
                self.offset(self.before)
            } else {
                self.offset(self.after)
            }
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_start_skips_missing_midnight() {
        // clocks jump from 00:00 to 01:00 on Monday
        let zone = ShiftZone {
            before: 0,
            after: 3600,
        };
        let now = zone.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap();
        let start = week_start(&now).unwrap();
        assert_eq!(
            start.naive_local(),
            NaiveDate::from_ymd_opt(2025, 10, 13)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        );
        assert_eq!(start.with_timezone(&Utc), utc(2025, 10, 13, 0));
    }

    #[test]
    fn test_week_start_repeated_midnight_takes_earliest() {
        // clocks fall back from 01:00 to 00:00 on Monday
        let zone = ShiftZone {
            before: 3600,
            after: 0,
        };
        let now = zone.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap();
        let start = week_start(&now).unwrap();
        assert_eq!(start.naive_local(), ShiftZone::transition());
        assert_eq!(start.with_timezone(&Utc), utc(2025, 10, 12, 23));
    }
}
