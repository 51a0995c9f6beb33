use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::ClientError;

use super::{paths, Config};

const GATEWAY_URL_ENV: &str = "BACKUP_GATEWAY_URL";
const GATEWAY_TOKEN_ENV: &str = "BACKUP_GATEWAY_TOKEN";

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let mut config = match paths::get_config_path() {
            Ok(path) => Self::load_from(&path).await,
            Err(err) => {
                warn!(error = ?err, "Failed to locate config.json, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Load configuration from an explicit path, falling back to defaults.
    pub async fn load_from(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(config) => {
                info!(
                    urls = ?config.gateway_urls,
                    log_level = %config.log_level,
                    "Loaded configuration"
                );
                config
            }
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        }
    }

    async fn try_load(config_path: &Path) -> Result<Self, ClientError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .await
            .map_err(|err| ClientError::Config(format!("Failed to read config file: {err}")))?;

        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|err| ClientError::Config(format!("Failed to parse config.json: {err}")))?;

        config.gateway_urls = normalize_urls(config.gateway_urls);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(custom) = env::var(GATEWAY_URL_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                let mut urls = vec![trimmed.to_string()];
                urls.extend(self.gateway_urls.drain(..));
                self.gateway_urls = normalize_urls(urls);
            }
        }
        if let Ok(token) = env::var(GATEWAY_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.api_token = Some(token.trim().to_string());
            }
        }
    }
}

/// Drops blanks and duplicates while keeping the configured order.
fn normalize_urls(urls: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for url in urls {
        let trimmed = url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() || unique.iter().any(|existing| existing == &trimmed) {
            continue;
        }
        unique.push(trimmed);
    }
    if unique.is_empty() {
        return Config::default().gateway_urls;
    }
    unique
}
