//! Application wiring: one explicitly constructed instance of every store.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::events::{self, EventBus, Unlisten};
use crate::gateway::{BackendApi, CommandGateway};
use crate::stores::{
    BackupJobStore, NavigationStore, NotificationStore, RepositoryStore, SettingsStore,
    SnapshotStore, SystemStore,
};

/// Every store the client keeps, sharing one gateway and one event bus.
#[derive(Clone)]
pub struct AppContext {
    pub api: BackendApi,
    pub bus: EventBus,
    pub repositories: RepositoryStore,
    pub snapshots: SnapshotStore,
    pub jobs: BackupJobStore,
    pub notifications: NotificationStore,
    pub navigation: NavigationStore,
    pub settings: SettingsStore,
    pub system: SystemStore,
}

impl AppContext {
    pub fn new(gateway: Arc<dyn CommandGateway>, config: &Config) -> Self {
        let api = BackendApi::new(gateway);
        Self {
            repositories: RepositoryStore::new(api.clone()),
            snapshots: SnapshotStore::new(api.clone()),
            jobs: BackupJobStore::new(api.clone()),
            notifications: NotificationStore::new(Duration::from_millis(config.toast_duration_ms)),
            navigation: NavigationStore::new(),
            settings: SettingsStore::new(api.clone()),
            system: SystemStore::new(api.clone()),
            bus: EventBus::new(),
            api,
        }
    }

    /// Return every backend-backed store to its initial state.
    pub fn reset(&self) {
        self.repositories.reset();
        self.snapshots.reset();
        self.jobs.reset();
        self.settings.reset();
        info!("Client state reset");
    }
}

/// Clear the running job once the backend reports it finished or failed.
pub fn track_running_job(bus: &EventBus, jobs: &BackupJobStore) -> Vec<Unlisten> {
    let on_completed = {
        let jobs = jobs.clone();
        events::on_backup_completed(bus, move |event| clear_if_running(&jobs, &event.job_id))
    };
    let on_failed = {
        let jobs = jobs.clone();
        events::on_backup_failed(bus, move |event| clear_if_running(&jobs, &event.job_id))
    };
    vec![on_completed, on_failed]
}

fn clear_if_running(jobs: &BackupJobStore, job_id: &str) {
    let running = jobs.running_job_id();
    if running.with(|current| current.as_deref() == Some(job_id)) {
        jobs.set_running_job_id(None);
    }
}

/// Turn backup and restore outcomes into toasts.
pub fn notify_outcomes(bus: &EventBus, notifications: &NotificationStore) -> Vec<Unlisten> {
    let mut handles = Vec::new();

    let toasts = notifications.clone();
    handles.push(events::on_backup_completed(bus, move |event| {
        if event.success {
            toasts.success(format!("Backup {} completed", event.job_id), None);
        } else {
            toasts.warning(format!("Backup {} finished with problems", event.job_id), None);
        }
    }));

    let toasts = notifications.clone();
    handles.push(events::on_backup_failed(bus, move |event| {
        toasts.error(format!("Backup {} failed: {}", event.job_id, event.error), None);
    }));

    let toasts = notifications.clone();
    handles.push(events::on_restore_completed(bus, move |_| {
        toasts.success("Restore completed", None);
    }));

    let toasts = notifications.clone();
    handles.push(events::on_restore_failed(bus, move |event| {
        toasts.error(format!("Restore failed: {}", event.error), None);
    }));

    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BACKUP_COMPLETED, BACKUP_FAILED};
    use crate::gateway::ScriptedGateway;
    use crate::stores::Severity;
    use serde_json::json;

    fn context() -> AppContext {
        AppContext::new(Arc::new(ScriptedGateway::new()), &Config::default())
    }

    #[test]
    fn completion_of_other_job_keeps_marker() {
        let app = context();
        let handles = track_running_job(&app.bus, &app.jobs);
        app.jobs.set_running_job_id(Some("job-1".into()));

        app.bus
            .emit(BACKUP_COMPLETED, &json!({ "jobId": "job-2", "success": true }));
        assert_eq!(app.jobs.running_job_id().get().as_deref(), Some("job-1"));

        app.bus
            .emit(BACKUP_FAILED, &json!({ "jobId": "job-1", "error": "disk full" }));
        assert_eq!(app.jobs.running_job_id().get(), None);

        for handle in handles {
            handle.unlisten();
        }
        assert_eq!(app.bus.listener_count(BACKUP_COMPLETED), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_become_toasts() {
        let app = context();
        let _handles = notify_outcomes(&app.bus, &app.notifications);

        app.bus
            .emit(BACKUP_FAILED, &json!({ "jobId": "job-1", "error": "disk full" }));

        let toasts = app.notifications.toasts().get();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Error);
        assert_eq!(toasts[0].message, "Backup job-1 failed: disk full");
    }

    #[test]
    fn contexts_are_isolated() {
        let a = context();
        let b = context();

        a.navigation.go_to_settings();
        a.jobs.set_running_job_id(Some("job-1".into()));

        assert_eq!(b.navigation.current_page().get(), crate::stores::Page::Dashboard);
        assert_eq!(b.jobs.running_job_id().get(), None);
    }
}
