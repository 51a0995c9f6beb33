use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional counters attached to a snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SnapshotSummary {
    #[serde(default)]
    pub files_count: Option<u64>,
    #[serde(default)]
    pub dirs_count: Option<u64>,
    #[serde(default)]
    pub data_size: Option<u64>,
}

/// A point-in-time backup record belonging to a repository.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub time: DateTime<Utc>,
    pub hostname: String,
    /// Display order is preserved; matching ignores order.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub total_size: u64,
    pub repository_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub summary: Option<SnapshotSummary>,
}

impl Snapshot {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// First eight characters of the id, as shown in listings.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Predicate over snapshots. Every unset criterion matches everything.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SnapshotFilter {
    /// Matches when the snapshot carries any of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to: Option<DateTime<Utc>>,
}

impl SnapshotFilter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
            ..Default::default()
        }
    }

    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| snapshot.has_tag(tag)) {
            return false;
        }
        if let Some(hostname) = &self.hostname {
            if !snapshot.hostname.eq_ignore_ascii_case(hostname) {
                return false;
            }
        }
        if let Some(from) = self.time_from {
            if snapshot.time < from {
                return false;
            }
        }
        if let Some(to) = self.time_to {
            if snapshot.time > to {
                return false;
            }
        }
        true
    }
}

/// Sort criterion for snapshot listings.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSort {
    Newest,
    Oldest,
    Largest,
    Hostname,
}

impl SnapshotSort {
    pub fn compare(&self, a: &Snapshot, b: &Snapshot) -> Ordering {
        match self {
            SnapshotSort::Newest => b.time.cmp(&a.time),
            SnapshotSort::Oldest => a.time.cmp(&b.time),
            SnapshotSort::Largest => b.total_size.cmp(&a.total_size),
            SnapshotSort::Hostname => a
                .hostname
                .to_lowercase()
                .cmp(&b.hostname.to_lowercase())
                .then_with(|| b.time.cmp(&a.time)),
        }
    }
}
