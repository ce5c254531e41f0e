//! # Usage Module
//!
//! Builds [`UsageSnapshot`]s from the two log sources and publishes them.
//!
//! ## Key Types
//!
//! - `build_snapshot`: one full scan, from file discovery to cost estimate
//! - `UsageMonitor`: owns the published snapshot and serializes refreshes
//!
//! A refresh either publishes a complete new snapshot or changes nothing. Readers
//! hold an `Arc` to whichever snapshot was current when they asked, so they never
//! observe a half-built one.

use chrono::{DateTime, Local, Utc};
use std::sync::{Arc, Mutex, RwLock, TryLockError};

use crate::config::MonitorConfig;
use crate::error::RefreshError;
use crate::models::{SourceKind, SourceSnapshot, UsageSnapshot};
use crate::sources::{FileLocator, FsLocator};
use crate::window::{WindowTotal, most_recent, sum_since, week_start};

fn source_snapshot(source: SourceKind, total: &WindowTotal) -> SourceSnapshot {
    SourceSnapshot {
        source,
        total_tokens: total.total_tokens,
        present: total.total_tokens > 0,
        files_counted: total.files_counted,
        files_skipped: total.files_skipped,
        records_skipped: total.records_skipped,
    }
}

/// Scan both sources as of `now` and assemble a fresh snapshot.
pub fn build_snapshot<L: FileLocator + ?Sized>(
    config: &MonitorConfig,
    locator: &L,
    now: DateTime<Local>,
) -> Result<UsageSnapshot, RefreshError> {
    let week_start =
        week_start(&now).ok_or_else(|| RefreshError::WeekStart(now.to_rfc3339()))?;
    let since: DateTime<Utc> = week_start.with_timezone(&Utc);

    let primary_files = locator
        .primary_files()
        .map_err(|error| RefreshError::Locate {
            source_name: SourceKind::Primary.label(),
            error,
        })?;
    let session = most_recent(&primary_files);
    let weekly_primary = sum_since(&primary_files, since);

    let secondary_files =
        locator
            .secondary_files()
            .map_err(|error| RefreshError::Locate {
                source_name: SourceKind::Secondary.label(),
                error,
            })?;
    let weekly_secondary = sum_since(&secondary_files, since);

    let weekly_total_tokens = weekly_primary
        .total_tokens
        .saturating_add(weekly_secondary.total_tokens);

    Ok(UsageSnapshot {
        session_tokens: session.total_tokens,
        weekly_primary_tokens: weekly_primary.total_tokens,
        weekly_secondary_tokens: weekly_secondary.total_tokens,
        weekly_total_tokens,
        session_limit: config.session_limit.max(1),
        weekly_limit: config.weekly_limit.max(1),
        cost_estimate: config.pricing.cost_for_tokens(weekly_total_tokens),
        week_start: Some(week_start),
        last_refreshed: Some(now),
        sources: [
            source_snapshot(SourceKind::Primary, &weekly_primary),
            source_snapshot(SourceKind::Secondary, &weekly_secondary),
        ],
    })
}

/// What happened to a refresh request.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Published(Arc<UsageSnapshot>),
    /// Another refresh was already running; this trigger was dropped.
    AlreadyRunning,
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> Option<&Arc<UsageSnapshot>> {
        match self {
            Self::Published(s) => Some(s),
            Self::AlreadyRunning => None,
        }
    }
}

/// Owner of the published snapshot.
///
/// Shared between the background refresh loop and presentation code behind an `Arc`.
pub struct UsageMonitor<L = FsLocator> {
    config: MonitorConfig,
    locator: L,
    current: RwLock<Arc<UsageSnapshot>>,
    refreshing: Mutex<()>,
}

impl UsageMonitor<FsLocator> {
    pub fn new(config: MonitorConfig) -> Self {
        let locator = FsLocator::from_config(&config);
        Self::with_locator(config, locator)
    }
}

impl<L: FileLocator> UsageMonitor<L> {
    pub fn with_locator(config: MonitorConfig, locator: L) -> Self {
        let empty = UsageSnapshot::empty(config.session_limit, config.weekly_limit);
        Self {
            config,
            locator,
            current: RwLock::new(Arc::new(empty)),
            refreshing: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// The latest complete snapshot.
    pub fn snapshot(&self) -> Arc<UsageSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.refresh_at(Local::now())
    }

    /// Rebuild and publish the snapshot as of `now`.
    ///
    /// Only one refresh runs at a time; a concurrent call returns
    /// [`RefreshOutcome::AlreadyRunning`] without waiting. On error the previously
    /// published snapshot is left untouched.
    pub fn refresh_at(&self, now: DateTime<Local>) -> Result<RefreshOutcome, RefreshError> {
        let _guard = match self.refreshing.try_lock() {
            Ok(g) => g,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::debug!("refresh already in progress; dropping trigger");
                return Ok(RefreshOutcome::AlreadyRunning);
            }
        };

        let snapshot = Arc::new(build_snapshot(&self.config, &self.locator, now)?);
        self.publish(Arc::clone(&snapshot));
        log::info!(
            "usage refreshed: session={} weekly={} (code={} desktop={}) skipped_files={} skipped_records={}",
            snapshot.session_tokens,
            snapshot.weekly_total_tokens,
            snapshot.weekly_primary_tokens,
            snapshot.weekly_secondary_tokens,
            snapshot.files_skipped(),
            snapshot.records_skipped(),
        );
        Ok(RefreshOutcome::Published(snapshot))
    }

    fn publish(&self, snapshot: Arc<UsageSnapshot>) {
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
