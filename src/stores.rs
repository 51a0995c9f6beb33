//! Local state owned by the client.
//!
//! Each store is an explicitly constructed object. Its fields are observables
//! that callers may read and subscribe to; only the store's own actions write
//! them. Actions that talk to the backend never fail outward: a rejection is
//! logged, its message lands in the store's `error` field and the action
//! returns normally (with `None`/`false` where a result is expected).

mod backup_jobs;
mod navigation;
mod notifications;
mod repositories;
mod settings;
mod snapshots;
mod system;

use tracing::error;

use crate::observable::{Observable, ReadOnly};
use crate::types::{failure_message, ClientError};

pub use backup_jobs::BackupJobStore;
pub use navigation::{NavigationStore, Page};
pub use notifications::{NotificationStore, Severity, Toast};
pub use repositories::RepositoryStore;
pub use settings::{SettingsStore, Theme};
pub use snapshots::SnapshotStore;
pub use system::SystemStore;

/// The `loading` / `error` pair every backend-facing store carries.
#[derive(Clone)]
struct ActionStatus {
    loading: Observable<bool>,
    error: Observable<Option<String>>,
}

impl ActionStatus {
    fn new() -> Self {
        Self {
            loading: Observable::new(false),
            error: Observable::new(None),
        }
    }

    /// Marks an action as in flight and clears the previous error.
    fn begin(&self) {
        self.loading.set(true);
        self.error.set(None);
    }

    fn finish(&self) {
        self.loading.set(false);
    }

    fn fail(&self, action: &str, err: &ClientError, fallback: &str) {
        error!(action, error = ?err, "Backend action failed");
        self.error.set(Some(failure_message(err, fallback)));
    }

    fn reset(&self) {
        self.loading.set(false);
        self.error.set(None);
    }

    fn loading(&self) -> ReadOnly<bool> {
        self.loading.read_only()
    }

    fn error(&self) -> ReadOnly<Option<String>> {
        self.error.read_only()
    }
}
