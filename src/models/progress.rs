use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common progress counters for long-running operations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ProgressInfo {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub percentage: Option<f32>,
}

impl ProgressInfo {
    /// Reported percentage, or one computed from the counters.
    pub fn percent(&self) -> Option<u8> {
        if let Some(percentage) = self.percentage {
            return Some(percentage.clamp(0.0, 100.0).round() as u8);
        }
        if self.total == 0 {
            return None;
        }
        let percent = self.current.saturating_mul(100) / self.total;
        Some(percent.min(100) as u8)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BackupProgress {
    #[serde(flatten)]
    pub base: ProgressInfo,
    #[serde(default)]
    pub files_processed: u64,
    #[serde(default)]
    pub bytes_processed: u64,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    #[serde(default)]
    pub current_file: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub estimated_time_remaining: Option<u64>,
}

impl BackupProgress {
    /// Byte-based completion when the total is known.
    pub fn byte_percent(&self) -> Option<u8> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100
            } else {
                let percent = self.bytes_processed.saturating_mul(100) / total;
                percent.min(100) as u8
            }
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RestoreProgress {
    #[serde(flatten)]
    pub base: ProgressInfo,
    #[serde(default)]
    pub files_restored: u64,
    #[serde(default)]
    pub bytes_restored: u64,
    #[serde(default)]
    pub current_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupCompleted {
    #[serde(alias = "job_id")]
    pub job_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupFailed {
    #[serde(alias = "job_id")]
    pub job_id: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestoreCompleted {
    #[serde(default, alias = "job_id")]
    pub job_id: Option<String>,
    #[serde(default, alias = "snapshot_id")]
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFailed {
    #[serde(default, alias = "job_id")]
    pub job_id: Option<String>,
    pub error: String,
}

/// Start or finish notice for a cron-triggered backup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduledBackupEvent {
    #[serde(alias = "jobId")]
    pub job_id: String,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backup_progress_flattens_base_counters() {
        let progress: BackupProgress = serde_json::from_value(json!({
            "current": 5,
            "total": 20,
            "message": "Uploading",
            "files_processed": 5,
            "bytes_processed": 512,
            "total_bytes": 2048,
            "current_file": "/home/user/a.txt"
        }))
        .unwrap();

        assert_eq!(progress.base.percent(), Some(25));
        assert_eq!(progress.byte_percent(), Some(25));
        assert_eq!(progress.base.message.as_deref(), Some("Uploading"));
    }

    #[test]
    fn explicit_percentage_wins_over_counters() {
        let info = ProgressInfo {
            current: 1,
            total: 10,
            message: None,
            percentage: Some(55.4),
        };
        assert_eq!(info.percent(), Some(55));
    }

    #[test]
    fn unknown_total_has_no_percent() {
        assert_eq!(ProgressInfo::default().percent(), None);
        assert_eq!(BackupProgress::default().byte_percent(), None);
    }

    #[test]
    fn completion_accepts_both_key_styles() {
        let camel: BackupCompleted =
            serde_json::from_value(json!({ "jobId": "job-1", "success": true })).unwrap();
        let snake: BackupCompleted =
            serde_json::from_value(json!({ "job_id": "job-1", "success": true })).unwrap();
        assert_eq!(camel, snake);
    }
}
