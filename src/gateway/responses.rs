use serde::Deserialize;
use serde_json::Value;

/// One event as delivered by the backend's event endpoint.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RemoteEvent {
    pub id: u64,
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

/// Result from long-polling the backend event stream.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    pub last_event_id: u64,
    pub events: Vec<RemoteEvent>,
}

impl EventBatch {
    pub fn from_events(since: u64, mut events: Vec<RemoteEvent>) -> Self {
        events.retain(|event| event.id > since);
        events.sort_by_key(|event| event.id);
        let last_event_id = events.last().map(|event| event.id).unwrap_or(since);
        Self {
            last_event_id,
            events,
        }
    }

    pub fn has_updates(&self) -> bool {
        !self.events.is_empty()
    }
}
