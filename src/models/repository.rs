use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage backend a repository lives on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Local,
    Sftp,
    S3,
    Rest,
    Rclone,
}

impl BackendType {
    /// Lower-case name used for `backendType` command arguments.
    pub fn as_arg(&self) -> &'static str {
        match self {
            BackendType::Local => "local",
            BackendType::Sftp => "sftp",
            BackendType::S3 => "s3",
            BackendType::Rest => "rest",
            BackendType::Rclone => "rclone",
        }
    }
}

/// Health of a repository as last reported by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryStatus {
    #[default]
    Healthy,
    Warning,
    Unavailable,
    Locked,
}

impl RepositoryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RepositoryStatus::Healthy => "Healthy",
            RepositoryStatus::Warning => "Needs attention",
            RepositoryStatus::Unavailable => "Unavailable",
            RepositoryStatus::Locked => "Locked",
        }
    }

    /// Whether snapshots can be listed and backups started.
    pub fn is_usable(&self) -> bool {
        matches!(self, RepositoryStatus::Healthy | RepositoryStatus::Warning)
    }
}

/// A configured backup destination.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "repository_type")]
    pub backend_type: BackendType,
    #[serde(default)]
    pub status: RepositoryStatus,
    #[serde(default)]
    pub snapshot_count: u32,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Detailed repository statistics.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RepositoryStats {
    pub snapshot_count: u32,
    pub index_count: u32,
    pub pack_count: u32,
    pub total_size: u64,
    pub data_size: u64,
    #[serde(default)]
    pub compression_ratio: Option<f64>,
    #[serde(default)]
    pub deduplication_ratio: Option<f64>,
}

/// Outcome of probing a backend before creating a repository on it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

/// A bookmarked repository location.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteLocation {
    pub id: String,
    pub name: String,
    pub path: String,
    pub location_type: BackendType,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}
