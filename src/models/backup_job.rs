use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many snapshots of each granularity to keep. Unset means no constraint.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetentionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_last: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_daily: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_weekly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_monthly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_yearly: Option<u32>,
}

impl RetentionPolicy {
    /// True when no rule is set, i.e. the policy keeps everything.
    pub fn is_unconstrained(&self) -> bool {
        self.keep_last.is_none()
            && self.keep_daily.is_none()
            && self.keep_weekly.is_none()
            && self.keep_monthly.is_none()
            && self.keep_yearly.is_none()
    }
}

/// Which snapshots a retention policy would keep and delete.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RetentionPreview {
    pub snapshots_to_keep: Vec<String>,
    pub snapshots_to_delete: Vec<String>,
}

/// A named, schedulable backup definition.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BackupJob {
    pub id: String,
    pub name: String,
    pub repository_id: String,
    #[serde(default)]
    pub source_paths: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cron expression; `None` for manual-only jobs.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retention: Option<RetentionPolicy>,
}

impl BackupJob {
    pub fn is_scheduled(&self) -> bool {
        self.enabled && self.schedule.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// One recorded run of a backup job.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobExecution {
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}
