use serde::{Deserialize, Serialize};

/// Application settings persisted by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    /// `system`, `light` or `dark`.
    pub theme: String,
    pub log_level: String,
    pub check_updates: bool,
    pub max_concurrent_backups: u32,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_language")]
    pub language: String,
    /// `system_keychain` or `in_memory`.
    #[serde(default = "default_password_storage")]
    pub password_storage: String,
    /// Minutes.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            log_level: "info".to_string(),
            check_updates: true,
            max_concurrent_backups: 1,
            notifications_enabled: true,
            language: default_language(),
            password_storage: default_password_storage(),
            lock_timeout: default_lock_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "de".to_string()
}

fn default_password_storage() -> String {
    "system_keychain".to_string()
}

fn default_lock_timeout() -> u32 {
    15
}

/// Where the backend keeps its relocatable configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PortableStoreStatus {
    pub portable_dir: String,
    pub effective_dir: String,
    pub read_only: bool,
    pub fallback_used: bool,
    pub encrypted: bool,
}

impl PortableStoreStatus {
    /// True when the user should be told settings are not stored next to the binary.
    pub fn needs_notice(&self) -> bool {
        self.read_only || self.fallback_used
    }
}
