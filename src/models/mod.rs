mod backup_job;
mod progress;
mod repository;
mod restore;
mod results;
mod settings;
mod snapshot;

pub use backup_job::{BackupJob, JobExecution, RetentionPolicy, RetentionPreview};
pub use progress::{
    BackupCompleted, BackupFailed, BackupProgress, ProgressInfo, RestoreCompleted, RestoreFailed,
    RestoreProgress, ScheduledBackupEvent,
};
pub use repository::{
    BackendType, ConnectionTestResult, FavoriteLocation, Repository, RepositoryStats,
    RepositoryStatus,
};
pub use restore::{FileTreeNode, RestoreOptions};
pub use results::{CheckResult, DiffResult, DiffStats, PruneResult};
pub use settings::{AppSettings, PortableStoreStatus};
pub use snapshot::{Snapshot, SnapshotFilter, SnapshotSort, SnapshotSummary};
