//! Periodic background refresh.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::models::UsageSnapshot;
use crate::sources::FileLocator;
use crate::usage::{RefreshOutcome, UsageMonitor};

/// Handle to the refresh thread. Dropping it stops the loop.
pub struct RefreshLoop {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// Refresh immediately, then every `interval` until stopped.
    ///
    /// `on_publish` runs on the refresh thread after each successful refresh.
    pub fn spawn<L, F>(monitor: Arc<UsageMonitor<L>>, interval: Duration, on_publish: F) -> Self
    where
        L: FileLocator + Send + Sync + 'static,
        F: Fn(&Arc<UsageSnapshot>) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("usage-refresh".to_string())
            .spawn(move || {
                loop {
                    match monitor.refresh() {
                        Ok(RefreshOutcome::Published(snapshot)) => on_publish(&snapshot),
                        Ok(RefreshOutcome::AlreadyRunning) => {}
                        Err(err) => log::warn!("usage refresh failed: {err}"),
                    }
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("refresh loop stopped");
            });
        let handle = match handle {
            Ok(h) => Some(h),
            Err(err) => {
                log::warn!("could not start refresh thread: {err}");
                None
            }
        };
        Self { stop_tx, handle }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the loop and wait for an in-flight refresh to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("refresh thread panicked");
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
