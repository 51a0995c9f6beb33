use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the gateway, the event transport and configuration loading.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend rejected a command. Displays as the backend's own message.
    #[error("{message}")]
    Gateway { command: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected payload: {0}")]
    Payload(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Builds a gateway rejection from whatever the backend sent back.
    ///
    /// Rejections arrive either as a bare string or as a structured
    /// `{ code, message, details }` object.
    pub fn rejected(command: &str, body: &Value) -> Self {
        ClientError::Gateway {
            command: command.to_string(),
            message: rejection_message(body).unwrap_or_default(),
        }
    }
}

fn rejection_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Human-readable text for a failed action, or `fallback` when the error carries none.
pub fn failure_message(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
