use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::{
    BackupCompleted, BackupFailed, BackupProgress, PortableStoreStatus, RestoreCompleted,
    RestoreFailed, RestoreProgress, ScheduledBackupEvent,
};

use super::bus::{EventBus, Unlisten};

pub const BACKUP_PROGRESS: &str = "backup-progress";
pub const BACKUP_COMPLETED: &str = "backup-completed";
pub const BACKUP_FAILED: &str = "backup-failed";
pub const RESTORE_PROGRESS: &str = "restore-progress";
pub const RESTORE_COMPLETED: &str = "restore-completed";
pub const RESTORE_FAILED: &str = "restore-failed";
pub const SCHEDULED_BACKUP_STARTED: &str = "scheduled-backup-started";
pub const SCHEDULED_BACKUP_COMPLETED: &str = "scheduled-backup-completed";
pub const PORTABLE_STORE_STATUS: &str = "portable-store-status";

/// `restore-progress-{job_id}` for a specific restore, `restore-progress` otherwise.
pub fn restore_progress_channel(job_id: Option<&str>) -> String {
    match job_id {
        Some(job_id) => format!("{RESTORE_PROGRESS}-{job_id}"),
        None => RESTORE_PROGRESS.to_string(),
    }
}

/// Register a callback that only ever sees payloads decoding to `T`.
fn listen_typed<T>(
    bus: &EventBus,
    channel: &str,
    callback: impl Fn(T) + Send + Sync + 'static,
) -> Unlisten
where
    T: DeserializeOwned,
{
    let name = channel.to_string();
    bus.listen(channel, move |payload| {
        match serde_json::from_value::<T>(payload.clone()) {
            Ok(event) => callback(event),
            Err(err) => warn!(channel = %name, error = ?err, "Dropping malformed event payload"),
        }
    })
}

pub fn on_backup_progress(
    bus: &EventBus,
    callback: impl Fn(BackupProgress) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, BACKUP_PROGRESS, callback)
}

pub fn on_backup_completed(
    bus: &EventBus,
    callback: impl Fn(BackupCompleted) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, BACKUP_COMPLETED, callback)
}

pub fn on_backup_failed(
    bus: &EventBus,
    callback: impl Fn(BackupFailed) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, BACKUP_FAILED, callback)
}

/// Progress of one restore when `job_id` is given, of unscoped restores otherwise.
pub fn on_restore_progress(
    bus: &EventBus,
    job_id: Option<&str>,
    callback: impl Fn(RestoreProgress) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, &restore_progress_channel(job_id), callback)
}

pub fn on_restore_completed(
    bus: &EventBus,
    callback: impl Fn(RestoreCompleted) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, RESTORE_COMPLETED, callback)
}

pub fn on_restore_failed(
    bus: &EventBus,
    callback: impl Fn(RestoreFailed) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, RESTORE_FAILED, callback)
}

pub fn on_scheduled_backup_started(
    bus: &EventBus,
    callback: impl Fn(ScheduledBackupEvent) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, SCHEDULED_BACKUP_STARTED, callback)
}

pub fn on_scheduled_backup_completed(
    bus: &EventBus,
    callback: impl Fn(ScheduledBackupEvent) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, SCHEDULED_BACKUP_COMPLETED, callback)
}

pub fn on_portable_store_status(
    bus: &EventBus,
    callback: impl Fn(PortableStoreStatus) + Send + Sync + 'static,
) -> Unlisten {
    listen_typed(bus, PORTABLE_STORE_STATUS, callback)
}
