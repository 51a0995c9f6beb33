use std::path::PathBuf;
use tracing::debug;

use crate::types::ClientError;

/// Get the path to the config.json file
/// Looks for config.json in the app directory (parent of the binary's folder),
/// then in the current directory
pub(super) fn get_config_path() -> Result<PathBuf, ClientError> {
    // Executable is at: app_root/bin/backup-state-monitor
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = std::env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(bin_dir) = exe_path.parent() {
            if let Some(app_root) = bin_dir.parent() {
                let config_path = app_root.join("config.json");
                debug!(path = %config_path.display(), "Looking for config");
                if config_path.exists() {
                    return Ok(config_path);
                }
                debug!("No config.json in app directory");
            }
        }
    }

    debug!("Using fallback: looking for config.json in current directory");
    Ok(PathBuf::from("config.json"))
}
