use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::{ClientError, Result};

use super::responses::{EventBatch, RemoteEvent};
use super::CommandGateway;

/// Command gateway talking JSON over HTTP to the backup engine.
///
/// Several base URLs may be configured; a transport failure moves the
/// gateway on to the next one for subsequent calls.
pub struct HttpGateway {
    api_token: Option<String>,
    http: Client,
    base_urls: Vec<String>,
    current_idx: AtomicUsize,
}

#[derive(Serialize)]
struct EventStreamQuery {
    since: u64,
    timeout: u64,
}

impl HttpGateway {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut base_urls = Vec::new();
        for url in &config.gateway_urls {
            push_unique_url(&mut base_urls, url.trim().trim_end_matches('/').to_string());
        }
        if base_urls.is_empty() {
            return Err(ClientError::Config("No gateway URL configured".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            api_token: config.api_token.clone(),
            http,
            base_urls,
            current_idx: AtomicUsize::new(0),
        })
    }

    fn base_url(&self) -> &str {
        let idx = self.current_idx.load(Ordering::Relaxed);
        &self.base_urls[idx.min(self.base_urls.len().saturating_sub(1))]
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Move on to the next configured URL after a transport failure.
    fn rotate(&self) {
        if self.base_urls.len() < 2 {
            return;
        }
        let next = (self.current_idx.load(Ordering::Relaxed) + 1) % self.base_urls.len();
        self.current_idx.store(next, Ordering::Relaxed);
        warn!(url = %self.base_urls[next], "Switching gateway URL");
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("X-API-Key", token),
            None => request,
        }
    }

    /// Long-poll the backend for events newer than `since`.
    pub async fn poll_events(&self, since: u64, timeout: Duration) -> Result<EventBatch> {
        let query = EventStreamQuery {
            since,
            timeout: timeout.as_secs().clamp(0, 300),
        };
        let request = self
            .authorize(self.http.get(self.url("/events")))
            .query(&query)
            // The long-poll itself may legitimately outlast the per-request timeout.
            .timeout(timeout + Duration::from_secs(10));

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                self.rotate();
                return Err(ClientError::Http(err));
            }
        };

        if !response.status().is_success() {
            return Err(ClientError::Payload(format!(
                "/events returned {}",
                response.status()
            )));
        }

        let events: Vec<RemoteEvent> = response.json().await.map_err(ClientError::Http)?;
        Ok(EventBatch::from_events(since, events))
    }
}

#[async_trait]
impl CommandGateway for HttpGateway {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        let url = self.url(&format!("/invoke/{command}"));
        debug!(command, url = %url, "Invoking backend command");

        let response = match self.authorize(self.http.post(url)).json(&args).send().await {
            Ok(response) => response,
            Err(err) => {
                self.rotate();
                return Err(ClientError::Http(err));
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(ClientError::Http)?;
        let value = parse_body(&body);

        if !status.is_success() {
            warn!(command, status = %status, "Backend rejected command");
            return Err(ClientError::rejected(command, &value));
        }

        Ok(value)
    }
}

/// Empty bodies are void results; non-JSON bodies are kept as plain text.
fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn push_unique_url(list: &mut Vec<String>, candidate: String) {
    if candidate.is_empty() {
        return;
    }
    if !list.iter().any(|existing| existing == &candidate) {
        list.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(urls: &[&str]) -> Config {
        Config {
            gateway_urls: urls.iter().map(|u| u.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn duplicate_urls_are_collapsed() {
        let gateway =
            HttpGateway::from_config(&config(&["http://a:1/", "http://a:1", "http://b:2"])).unwrap();
        assert_eq!(gateway.base_urls, vec!["http://a:1", "http://b:2"]);
        assert_eq!(gateway.url("/invoke/list_repositories"), "http://a:1/invoke/list_repositories");
    }

    #[test]
    fn rotate_cycles_through_urls() {
        let gateway = HttpGateway::from_config(&config(&["http://a:1", "http://b:2"])).unwrap();
        gateway.rotate();
        assert_eq!(gateway.base_url(), "http://b:2");
        gateway.rotate();
        assert_eq!(gateway.base_url(), "http://a:1");
    }

    #[test]
    fn no_urls_is_a_config_error() {
        let result = HttpGateway::from_config(&config(&[" "]));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("[1,2]"), json!([1, 2]));
        assert_eq!(parse_body("Repository locked"), json!("Repository locked"));
    }
}
