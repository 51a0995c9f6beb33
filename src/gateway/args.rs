//! Argument objects sent with each command. Keys are camelCase on the wire.

use serde::Serialize;
use serde_json::Value;

use crate::models::{AppSettings, BackupJob, RestoreOptions, RetentionPolicy, SnapshotFilter};

#[derive(Debug, Serialize)]
pub struct NoArgs {}

#[derive(Debug, Serialize)]
pub struct IdArgs<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRepositoryArgs<'a> {
    pub path: &'a str,
    pub password: &'a str,
    pub backend_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_options: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct PathPasswordArgs<'a> {
    pub path: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRepositoryArgs<'a> {
    pub repository_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRepositoryArgs<'a> {
    pub repository_id: &'a str,
    pub trust_cache: bool,
    pub read_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRepositoryArgs<'a> {
    pub id: &'a str,
    pub delete_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneRepositoryArgs<'a> {
    pub repository_id: &'a str,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordArgs<'a> {
    pub repository_id: &'a str,
    pub old_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshotsArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotIdArgs<'a> {
    pub snapshot_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareSnapshotsArgs<'a> {
    pub id_a: &'a str,
    pub id_b: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTagsArgs<'a> {
    pub snapshot_id: &'a str,
    pub tags: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredSnapshotsArgs<'a> {
    pub repository_path: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a SnapshotFilter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetSnapshotsArgs<'a> {
    pub snapshot_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct JobArgs<'a> {
    pub job: &'a BackupJob,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobIdArgs<'a> {
    pub job_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBackupArgs<'a> {
    pub job_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistoryArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeArgs<'a> {
    pub repository_path: &'a str,
    pub password: &'a str,
    pub snapshot_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFilesArgs<'a> {
    pub repository_path: &'a str,
    pub password: &'a str,
    pub snapshot_id: &'a str,
    pub files: &'a [String],
    pub target_path: &'a str,
    pub options: &'a RestoreOptions,
}

#[derive(Debug, Serialize)]
pub struct PolicyArgs<'a> {
    pub policy: &'a RetentionPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPasswordArgs<'a> {
    pub repo_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SettingsArgs<'a> {
    pub settings: &'a AppSettings,
}

#[derive(Debug, Serialize)]
pub struct ThemeArgs<'a> {
    pub theme: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestArgs<'a> {
    pub backend_type: &'a str,
    pub backend_options: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocationArgs<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub location_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<&'a Value>,
}
