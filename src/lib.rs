//! Client-side state synchronization for a backup manager.
//!
//! Stores hold the local view of repositories, snapshots, jobs and
//! notifications; they talk to the backup engine through a
//! [`gateway::CommandGateway`] and receive progress over an
//! [`events::EventBus`].

pub mod app;
pub mod config;
pub mod events;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod observable;
pub mod stores;
pub mod types;

pub use app::AppContext;
pub use config::Config;
pub use types::{ClientError, Result};
