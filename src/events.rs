//! Push-style event channels.
//!
//! The [`EventBus`] is a dispatch table keyed by channel name. Listeners only
//! see events emitted after they registered, and every listener on a channel
//! receives every event. The [`EventPump`] feeds the bus from the backend.

mod bus;
mod channels;
mod pump;

pub use bus::{EventBus, Unlisten};
pub use channels::{
    on_backup_completed, on_backup_failed, on_backup_progress, on_portable_store_status,
    on_restore_completed, on_restore_failed, on_restore_progress, on_scheduled_backup_completed,
    on_scheduled_backup_started, restore_progress_channel, BACKUP_COMPLETED, BACKUP_FAILED,
    BACKUP_PROGRESS, PORTABLE_STORE_STATUS, RESTORE_COMPLETED, RESTORE_FAILED, RESTORE_PROGRESS,
    SCHEDULED_BACKUP_COMPLETED, SCHEDULED_BACKUP_STARTED,
};
pub use pump::{EventPump, EventSource, PumpHandle};
