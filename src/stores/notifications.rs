use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::observable::{Observable, ReadOnly};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3500);

/// Shared by every store instance so ids are never reused within the process.
static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    /// Zero means the toast stays until removed.
    pub duration_ms: u64,
}

/// Short-lived user-facing messages that expire on their own.
#[derive(Clone)]
pub struct NotificationStore {
    toasts: Observable<Vec<Toast>>,
    default_duration: Duration,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl NotificationStore {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            toasts: Observable::new(Vec::new()),
            default_duration,
        }
    }

    pub fn toasts(&self) -> ReadOnly<Vec<Toast>> {
        self.toasts.read_only()
    }

    /// Show a toast for the default duration and return its id.
    pub fn show(&self, severity: Severity, message: impl Into<String>) -> u64 {
        self.show_for(severity, message, self.default_duration)
    }

    /// Show a toast removed after `duration`; `Duration::ZERO` keeps it until removed.
    ///
    /// Expiry runs on the current Tokio runtime, or on a timer thread when
    /// called outside one.
    pub fn show_for(&self, severity: Severity, message: impl Into<String>, duration: Duration) -> u64 {
        let id = NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            severity,
            message: message.into(),
            duration_ms: duration.as_millis().try_into().unwrap_or(u64::MAX),
        };
        debug!(id, severity = ?toast.severity, "Showing toast");
        self.toasts.update(|toasts| toasts.push(toast));

        if !duration.is_zero() {
            self.schedule_expiry(id, duration);
        }
        id
    }

    /// Show a success toast. `None` uses the store's default duration.
    pub fn success(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show_with(Severity::Success, message, duration)
    }

    pub fn error(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show_with(Severity::Error, message, duration)
    }

    pub fn warning(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show_with(Severity::Warning, message, duration)
    }

    pub fn info(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show_with(Severity::Info, message, duration)
    }

    fn show_with(&self, severity: Severity, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show_for(severity, message, duration.unwrap_or(self.default_duration))
    }

    /// Remove a toast. Removing an unknown or already removed id does nothing.
    pub fn remove(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|toast| toast.id != id));
    }

    fn schedule_expiry(&self, id: u64, duration: Duration) {
        let store = self.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    store.remove(id);
                });
            }
            Err(_) => {
                debug!(id, "No async runtime, expiring toast on a timer thread");
                let spawned = thread::Builder::new()
                    .name("toast-expiry".to_string())
                    .spawn(move || {
                        thread::sleep(duration);
                        store.remove(id);
                    });
                if let Err(err) = spawned {
                    warn!(id, error = ?err, "Failed to start toast expiry timer, removing now");
                    self.remove(id);
                }
            }
        }
    }
}
