use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub added_count: u64,
    pub removed_count: u64,
    pub modified_count: u64,
    /// Net change in bytes; negative when the newer snapshot is smaller.
    pub total_size_change: i64,
}

/// Differences between two snapshots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DiffResult {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub stats: DiffStats,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Repository integrity check outcome.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CheckResult {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub is_ok: bool,
}

/// Prune outcome; with `dry_run` set nothing was actually removed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PruneResult {
    pub packs_removed: u64,
    pub packs_kept: u64,
    pub packs_recovered: u64,
    pub size_removed: u64,
    pub size_kept: u64,
    pub size_recovered: u64,
    pub dry_run: bool,
}
