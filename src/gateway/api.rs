use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    AppSettings, BackendType, BackupJob, CheckResult, ConnectionTestResult, DiffResult,
    FavoriteLocation, FileTreeNode, JobExecution, PortableStoreStatus, PruneResult, Repository,
    RepositoryStats, RestoreOptions, RetentionPolicy, RetentionPreview, Snapshot, SnapshotFilter,
};
use crate::types::{ClientError, Result};

use super::args::*;
use super::CommandGateway;

/// Typed access to every backend command.
#[derive(Clone)]
pub struct BackendApi {
    gateway: Arc<dyn CommandGateway>,
}

impl BackendApi {
    pub fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self { gateway }
    }

    async fn call<A, T>(&self, command: &str, args: A) -> Result<T>
    where
        A: Serialize,
        T: DeserializeOwned,
    {
        let value = self.send(command, args).await?;
        serde_json::from_value(value).map_err(|err| {
            warn!(command, error = ?err, "Unexpected result shape");
            ClientError::Json(err)
        })
    }

    /// For commands whose result carries no data.
    async fn call_void<A: Serialize>(&self, command: &str, args: A) -> Result<()> {
        self.send(command, args).await.map(|_| ())
    }

    async fn send<A: Serialize>(&self, command: &str, args: A) -> Result<Value> {
        let args = serde_json::to_value(args)?;
        debug!(command, "Calling backend");
        self.gateway.invoke(command, args).await
    }

    // Repositories

    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.call("list_repositories", NoArgs {}).await
    }

    pub async fn init_repository(
        &self,
        path: &str,
        password: &str,
        backend_type: BackendType,
        backend_options: Option<&Value>,
    ) -> Result<Repository> {
        let args = InitRepositoryArgs {
            path,
            password,
            backend_type: backend_type.as_arg(),
            backend_options,
        };
        self.call("init_repository", args).await
    }

    pub async fn open_repository(&self, path: &str, password: &str) -> Result<Repository> {
        self.call("open_repository", PathPasswordArgs { path, password })
            .await
    }

    pub async fn switch_repository(&self, repository_id: &str, password: &str) -> Result<Repository> {
        let args = SwitchRepositoryArgs {
            repository_id,
            password,
        };
        self.call("switch_repository", args).await
    }

    /// Opens the repository at `path` to verify it, returning its description.
    pub async fn check_repository_v1(&self, path: &str, password: &str) -> Result<Repository> {
        self.call("check_repository_v1", PathPasswordArgs { path, password })
            .await
    }

    pub async fn check_repository(
        &self,
        repository_id: &str,
        trust_cache: bool,
        read_data: bool,
    ) -> Result<CheckResult> {
        let args = CheckRepositoryArgs {
            repository_id,
            trust_cache,
            read_data,
        };
        self.call("check_repository", args).await
    }

    pub async fn delete_repository(&self, id: &str, delete_data: bool) -> Result<()> {
        self.call_void("delete_repository", DeleteRepositoryArgs { id, delete_data })
            .await
    }

    pub async fn remove_repository_from_config(&self, id: &str) -> Result<()> {
        self.call_void("remove_repository_from_config", IdArgs { id })
            .await
    }

    pub async fn prune_repository(&self, repository_id: &str, dry_run: bool) -> Result<PruneResult> {
        let args = PruneRepositoryArgs {
            repository_id,
            dry_run,
        };
        self.call("prune_repository", args).await
    }

    pub async fn change_password(
        &self,
        repository_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let args = ChangePasswordArgs {
            repository_id,
            old_password,
            new_password,
        };
        self.call_void("change_password", args).await
    }

    pub async fn get_repository_stats(&self, id: &str) -> Result<RepositoryStats> {
        self.call("get_repository_stats", IdArgs { id }).await
    }

    pub async fn test_repository_connection(
        &self,
        backend_type: BackendType,
        backend_options: &Value,
    ) -> Result<ConnectionTestResult> {
        let args = ConnectionTestArgs {
            backend_type: backend_type.as_arg(),
            backend_options,
        };
        self.call("test_repository_connection", args).await
    }

    // Snapshots

    pub async fn list_snapshots(&self, repository_id: Option<&str>) -> Result<Vec<Snapshot>> {
        self.call("list_snapshots", ListSnapshotsArgs { repository_id })
            .await
    }

    pub async fn get_snapshot_info(&self, id: &str) -> Result<Snapshot> {
        self.call("get_snapshot_info", IdArgs { id }).await
    }

    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        self.call_void("delete_snapshot", SnapshotIdArgs { snapshot_id })
            .await
    }

    pub async fn forget_snapshots(&self, snapshot_ids: &[String]) -> Result<Vec<String>> {
        self.call("forget_snapshots", ForgetSnapshotsArgs { snapshot_ids })
            .await
    }

    pub async fn compare_snapshots(&self, id_a: &str, id_b: &str, password: &str) -> Result<DiffResult> {
        let args = CompareSnapshotsArgs {
            id_a,
            id_b,
            password,
        };
        self.call("compare_snapshots", args).await
    }

    pub async fn add_snapshot_tags(&self, snapshot_id: &str, tags: &[String]) -> Result<()> {
        self.call_void("add_snapshot_tags", SnapshotTagsArgs { snapshot_id, tags })
            .await
    }

    pub async fn remove_snapshot_tags(&self, snapshot_id: &str, tags: &[String]) -> Result<()> {
        self.call_void("remove_snapshot_tags", SnapshotTagsArgs { snapshot_id, tags })
            .await
    }

    pub async fn list_snapshots_filtered(
        &self,
        repository_path: &str,
        password: &str,
        filter: Option<&SnapshotFilter>,
    ) -> Result<Vec<Snapshot>> {
        let args = FilteredSnapshotsArgs {
            repository_path,
            password,
            filter,
        };
        self.call("list_snapshots_filtered", args).await
    }

    // Backup jobs

    pub async fn list_backup_jobs(&self) -> Result<Vec<BackupJob>> {
        self.call("list_backup_jobs", NoArgs {}).await
    }

    pub async fn get_backup_job(&self, id: &str) -> Result<BackupJob> {
        self.call("get_backup_job", IdArgs { id }).await
    }

    /// Returns the id the backend assigned to the new job.
    pub async fn create_backup_job(&self, job: &BackupJob) -> Result<String> {
        self.call("create_backup_job", JobArgs { job }).await
    }

    pub async fn update_backup_job(&self, job: &BackupJob) -> Result<()> {
        self.call_void("update_backup_job", JobArgs { job }).await
    }

    pub async fn delete_backup_job(&self, id: &str) -> Result<()> {
        self.call_void("delete_backup_job", IdArgs { id }).await
    }

    pub async fn schedule_backup(&self, job_id: &str, cron_expression: Option<&str>) -> Result<()> {
        let args = ScheduleBackupArgs {
            job_id,
            cron_expression,
        };
        self.call_void("schedule_backup", args).await
    }

    pub async fn unschedule_backup(&self, job_id: &str) -> Result<()> {
        self.call_void("unschedule_backup", JobIdArgs { job_id })
            .await
    }

    pub async fn list_scheduled_backups(&self) -> Result<Vec<String>> {
        self.call("list_scheduled_backups", NoArgs {}).await
    }

    pub async fn run_backup(&self, job_id: &str) -> Result<()> {
        self.call_void("run_backup", JobIdArgs { job_id }).await
    }

    pub async fn cancel_backup(&self, job_id: &str) -> Result<()> {
        self.call_void("cancel_backup", JobIdArgs { job_id }).await
    }

    pub async fn list_job_history(
        &self,
        job_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<JobExecution>> {
        self.call("list_job_history", JobHistoryArgs { job_id, limit })
            .await
    }

    // Restore

    pub async fn get_file_tree(
        &self,
        repository_path: &str,
        password: &str,
        snapshot_id: &str,
        path: Option<&str>,
    ) -> Result<FileTreeNode> {
        let args = FileTreeArgs {
            repository_path,
            password,
            snapshot_id,
            path,
        };
        self.call("get_file_tree_command", args).await
    }

    pub async fn restore_files(
        &self,
        repository_path: &str,
        password: &str,
        snapshot_id: &str,
        files: &[String],
        target_path: &str,
        options: &RestoreOptions,
    ) -> Result<()> {
        let args = RestoreFilesArgs {
            repository_path,
            password,
            snapshot_id,
            files,
            target_path,
            options,
        };
        self.call_void("restore_files_command", args).await
    }

    // Retention

    pub async fn preview_retention_policy(&self, policy: &RetentionPolicy) -> Result<RetentionPreview> {
        self.call("preview_retention_policy", PolicyArgs { policy })
            .await
    }

    /// Returns the ids of the snapshots that were deleted.
    pub async fn apply_retention_policy(&self, policy: &RetentionPolicy) -> Result<Vec<String>> {
        self.call("apply_retention_policy", PolicyArgs { policy })
            .await
    }

    // Credentials

    pub async fn store_repository_password(&self, repo_id: &str, password: &str) -> Result<()> {
        let args = RepositoryPasswordArgs {
            repo_id,
            password: Some(password),
        };
        self.call_void("store_repository_password", args).await
    }

    /// `None` when no password is stored for the repository.
    pub async fn get_repository_password(&self, repo_id: &str) -> Result<Option<String>> {
        let args = RepositoryPasswordArgs {
            repo_id,
            password: None,
        };
        self.call("get_repository_password", args).await
    }

    pub async fn delete_repository_password(&self, repo_id: &str) -> Result<()> {
        let args = RepositoryPasswordArgs {
            repo_id,
            password: None,
        };
        self.call_void("delete_repository_password", args).await
    }

    // Settings and system

    pub async fn get_settings(&self) -> Result<AppSettings> {
        self.call("get_settings", NoArgs {}).await
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.call_void("save_settings", SettingsArgs { settings })
            .await
    }

    pub async fn reset_settings(&self) -> Result<AppSettings> {
        self.call("reset_settings", NoArgs {}).await
    }

    pub async fn update_theme(&self, theme: &str) -> Result<()> {
        self.call_void("update_theme", ThemeArgs { theme }).await
    }

    pub async fn get_portable_status(&self) -> Result<PortableStoreStatus> {
        self.call("get_portable_status", NoArgs {}).await
    }

    // Favorite locations

    pub async fn save_favorite_location(
        &self,
        name: &str,
        path: &str,
        location_type: BackendType,
        config: Option<&Value>,
    ) -> Result<FavoriteLocation> {
        let args = FavoriteLocationArgs {
            name,
            path,
            location_type: location_type.as_arg(),
            config,
        };
        self.call("save_favorite_location", args).await
    }

    pub async fn list_favorite_locations(&self) -> Result<Vec<FavoriteLocation>> {
        self.call("list_favorite_locations", NoArgs {}).await
    }

    pub async fn update_favorite_last_used(&self, id: &str) -> Result<()> {
        self.call_void("update_favorite_last_used", IdArgs { id })
            .await
    }

    pub async fn delete_favorite_location(&self, id: &str) -> Result<()> {
        self.call_void("delete_favorite_location", IdArgs { id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ScriptedGateway;
    use serde_json::json;

    fn api() -> (Arc<ScriptedGateway>, BackendApi) {
        let gateway = Arc::new(ScriptedGateway::new());
        let api = BackendApi::new(gateway.clone());
        (gateway, api)
    }

    #[tokio::test]
    async fn typed_results_are_decoded() {
        let (gateway, api) = api();
        gateway.respond(
            "check_repository",
            json!({ "errors": [], "warnings": ["stale lock"], "is_ok": true }),
        );

        let result = api.check_repository("repo-1", true, false).await.unwrap();

        assert!(result.is_ok);
        assert_eq!(result.warnings, vec!["stale lock"]);
        assert_eq!(
            gateway.calls_to("check_repository"),
            vec![json!({ "repositoryId": "repo-1", "trustCache": true, "readData": false })]
        );
    }

    #[tokio::test]
    async fn void_commands_ignore_result_body() {
        let (gateway, api) = api();
        gateway.respond("run_backup", Value::Null);

        api.run_backup("job-7").await.unwrap();

        assert_eq!(gateway.calls_to("run_backup"), vec![json!({ "jobId": "job-7" })]);
    }

    #[tokio::test]
    async fn wrong_result_shape_is_a_json_error() {
        let (gateway, api) = api();
        gateway.respond("list_repositories", json!({ "not": "a list" }));

        let result = api.list_repositories().await;

        assert!(matches!(result, Err(ClientError::Json(_))));
    }

    #[tokio::test]
    async fn optional_arguments_are_omitted() {
        let (gateway, api) = api();
        gateway.respond("list_snapshots", json!([]));
        gateway.respond("get_repository_password", Value::Null);

        api.list_snapshots(None).await.unwrap();
        let password = api.get_repository_password("repo-1").await.unwrap();

        assert_eq!(gateway.calls_to("list_snapshots"), vec![json!({})]);
        assert_eq!(
            gateway.calls_to("get_repository_password"),
            vec![json!({ "repoId": "repo-1" })]
        );
        assert_eq!(password, None);
    }
}
