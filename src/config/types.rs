use serde::{Deserialize, Serialize};

/// Configuration for the backup state client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway base URLs, tried in order.
    #[serde(default = "default_gateway_urls")]
    pub gateway_urls: Vec<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_event_poll_timeout_secs")]
    pub event_poll_timeout_secs: u64,

    /// Default lifetime of a notification in milliseconds.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_urls: default_gateway_urls(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            event_poll_timeout_secs: default_event_poll_timeout_secs(),
            toast_duration_ms: default_toast_duration_ms(),
            log_level: default_log_level(),
        }
    }
}

fn default_gateway_urls() -> Vec<String> {
    vec!["http://127.0.0.1:7878".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_poll_timeout_secs() -> u64 {
    60
}

fn default_toast_duration_ms() -> u64 {
    3500
}

fn default_log_level() -> String {
    "info".to_string()
}
