use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file or directory inside a snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    /// `None` for files and for directories that have not been expanded yet.
    #[serde(default)]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    /// Sum of all file sizes below (and including) this node.
    pub fn total_size(&self) -> u64 {
        let own = if self.is_directory { 0 } else { self.size.unwrap_or(0) };
        let children = self
            .children
            .iter()
            .flatten()
            .map(FileTreeNode::total_size)
            .fold(0u64, u64::saturating_add);
        own.saturating_add(children)
    }
}

/// How a restore writes files to the target.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RestoreOptions {
    pub snapshot_id: String,
    pub target_path: String,
    /// Empty restores everything.
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_true")]
    pub restore_permissions: bool,
    #[serde(default = "default_true")]
    pub restore_timestamps: bool,
    #[serde(default)]
    pub dry_run: bool,
}

impl RestoreOptions {
    pub fn new(snapshot_id: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            target_path: target_path.into(),
            paths: Vec::new(),
            overwrite: false,
            restore_permissions: true,
            restore_timestamps: true,
            dry_run: false,
        }
    }
}

fn default_true() -> bool {
    true
}
