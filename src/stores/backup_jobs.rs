use tracing::info;

use crate::gateway::BackendApi;
use crate::models::BackupJob;
use crate::observable::{Observable, ReadOnly};

use super::ActionStatus;

/// Local cache of backup jobs and which one is currently running.
///
/// The store does not listen for completion events itself; see
/// [`crate::app::track_running_job`] for the caller-side wiring.
#[derive(Clone)]
pub struct BackupJobStore {
    api: BackendApi,
    jobs: Observable<Vec<BackupJob>>,
    running_job_id: Observable<Option<String>>,
    status: ActionStatus,
}

impl BackupJobStore {
    pub fn new(api: BackendApi) -> Self {
        Self {
            api,
            jobs: Observable::new(Vec::new()),
            running_job_id: Observable::new(None),
            status: ActionStatus::new(),
        }
    }

    pub fn jobs(&self) -> ReadOnly<Vec<BackupJob>> {
        self.jobs.read_only()
    }

    pub fn running_job_id(&self) -> ReadOnly<Option<String>> {
        self.running_job_id.read_only()
    }

    pub fn loading(&self) -> ReadOnly<bool> {
        self.status.loading()
    }

    pub fn error(&self) -> ReadOnly<Option<String>> {
        self.status.error()
    }

    pub fn set_jobs(&self, list: Vec<BackupJob>) {
        self.jobs.set(list);
    }

    pub fn add_job(&self, job: BackupJob) {
        self.jobs.update(|jobs| jobs.push(job));
    }

    /// Replace the job with the same id. Unknown ids are ignored.
    pub fn update_job(&self, job: BackupJob) {
        self.jobs.update(|jobs| {
            if let Some(entry) = jobs.iter_mut().find(|entry| entry.id == job.id) {
                *entry = job;
            }
        });
    }

    pub fn remove_job(&self, id: &str) {
        self.jobs.update(|jobs| jobs.retain(|job| job.id != id));
    }

    pub fn set_running_job_id(&self, id: Option<String>) {
        self.running_job_id.set(id);
    }

    pub async fn load_jobs(&self) {
        self.status.begin();
        match self.api.list_backup_jobs().await {
            Ok(list) => self.jobs.set(list),
            Err(err) => self
                .status
                .fail("load_jobs", &err, "Failed to load backup jobs"),
        }
        self.status.finish();
    }

    /// Create `job` on the backend. The stored copy carries the id the backend assigned.
    pub async fn create_job(&self, job: BackupJob) -> Option<BackupJob> {
        self.status.begin();
        let result = match self.api.create_backup_job(&job).await {
            Ok(id) => {
                let created = BackupJob { id, ..job };
                self.add_job(created.clone());
                info!(job = %created.id, name = %created.name, "Backup job created");
                Some(created)
            }
            Err(err) => {
                self.status
                    .fail("create_backup_job", &err, "Failed to create backup job");
                None
            }
        };
        self.status.finish();
        result
    }

    pub async fn save_job(&self, job: BackupJob) -> bool {
        self.status.begin();
        let saved = match self.api.update_backup_job(&job).await {
            Ok(()) => {
                self.update_job(job);
                true
            }
            Err(err) => {
                self.status
                    .fail("update_backup_job", &err, "Failed to save backup job");
                false
            }
        };
        self.status.finish();
        saved
    }

    pub async fn delete_job(&self, id: &str) -> bool {
        self.status.begin();
        let deleted = match self.api.delete_backup_job(id).await {
            Ok(()) => {
                self.remove_job(id);
                true
            }
            Err(err) => {
                self.status
                    .fail("delete_backup_job", &err, "Failed to delete backup job");
                false
            }
        };
        self.status.finish();
        deleted
    }

    /// Start a backup run. The job stays marked as running until the caller
    /// clears it, normally on a completion or failure event.
    pub async fn run_job(&self, id: &str) -> bool {
        self.status.error.set(None);
        self.running_job_id.set(Some(id.to_string()));
        match self.api.run_backup(id).await {
            Ok(()) => {
                info!(job = id, "Backup started");
                true
            }
            Err(err) => {
                self.status.fail("run_backup", &err, "Failed to start backup");
                self.running_job_id.set(None);
                false
            }
        }
    }

    /// Ask the backend to cancel a run. Does not clear the running marker.
    pub async fn cancel_job(&self, id: &str) -> bool {
        match self.api.cancel_backup(id).await {
            Ok(()) => true,
            Err(err) => {
                self.status
                    .fail("cancel_backup", &err, "Failed to cancel backup");
                false
            }
        }
    }

    pub fn reset(&self) {
        self.jobs.set(Vec::new());
        self.running_job_id.set(None);
        self.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{job, scripted};
    use serde_json::{json, Value};

    #[test]
    fn update_of_unknown_id_is_ignored() {
        let (_gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        store.set_jobs(vec![job("1", "Documents")]);

        store.update_job(job("999", "X"));
        store.remove_job("999");

        assert_eq!(store.jobs().get(), vec![job("1", "Documents")]);
    }

    #[test]
    fn update_replaces_matching_job() {
        let (_gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        store.set_jobs(vec![job("1", "Documents"), job("2", "Photos")]);

        store.update_job(job("2", "Pictures"));

        let names: Vec<String> = store.jobs().get().into_iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["Documents", "Pictures"]);
    }

    #[tokio::test]
    async fn create_uses_backend_id() {
        let (gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        gateway.respond("create_backup_job", "job-42");

        let created = store.create_job(job("", "Documents")).await.unwrap();

        assert_eq!(created.id, "job-42");
        assert_eq!(store.jobs().get(), vec![created]);
        let args = gateway.calls_to("create_backup_job");
        assert_eq!(args[0]["job"]["name"], json!("Documents"));
    }

    #[tokio::test]
    async fn load_failure_keeps_jobs() {
        let (gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        store.set_jobs(vec![job("1", "Documents")]);
        gateway.reject("list_backup_jobs", "Backend error");

        store.load_jobs().await;

        assert_eq!(store.jobs().get().len(), 1);
        assert_eq!(store.error().get().as_deref(), Some("Backend error"));
        assert!(!store.loading().get());
    }

    #[tokio::test]
    async fn run_marks_job_running_until_cleared() {
        let (gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        gateway
            .respond("run_backup", Value::Null)
            .respond("cancel_backup", Value::Null);

        assert!(store.run_job("1").await);
        assert_eq!(store.running_job_id().get().as_deref(), Some("1"));

        assert!(store.cancel_job("1").await);
        assert_eq!(store.running_job_id().get().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn failed_run_clears_running_marker() {
        let (gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        gateway.reject("run_backup", "Repository is locked");

        assert!(!store.run_job("1").await);

        assert_eq!(store.running_job_id().get(), None);
        assert_eq!(store.error().get().as_deref(), Some("Repository is locked"));
    }

    #[tokio::test]
    async fn save_and_delete_round_through_backend() {
        let (gateway, api) = scripted();
        let store = BackupJobStore::new(api);
        store.set_jobs(vec![job("1", "Documents")]);
        gateway
            .respond("update_backup_job", Value::Null)
            .respond("delete_backup_job", Value::Null);

        assert!(store.save_job(job("1", "Docs")).await);
        assert_eq!(store.jobs().get()[0].name, "Docs");

        assert!(store.delete_job("1").await);
        assert!(store.jobs().get().is_empty());
        assert_eq!(gateway.calls_to("delete_backup_job"), vec![json!({ "id": "1" })]);
    }
}
