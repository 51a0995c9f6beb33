use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    channels: HashMap<String, Vec<(u64, Handler)>>,
}

/// In-process fan-out of named events. Cloning shares the same table.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events emitted on `channel` from now on.
    pub fn listen(
        &self,
        channel: &str,
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Unlisten {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .channels
                .entry(channel.to_string())
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };
        trace!(channel, id, "Listener registered");

        Unlisten {
            channel: channel.to_string(),
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `payload` to every listener currently registered on `channel`.
    ///
    /// Returns how many listeners were called.
    pub fn emit(&self, channel: &str, payload: &Value) -> usize {
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock();
            registry
                .channels
                .get(channel)
                .map(|list| list.iter().map(|(_, handler)| Arc::clone(handler)).collect())
                .unwrap_or_default()
        };
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.registry
            .lock()
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }
}

/// Registration handle returned by [`EventBus::listen`].
///
/// The registration stays active until [`unlisten`](Unlisten::unlisten) is
/// called; dropping the handle does not remove it.
#[must_use = "keep the handle to be able to unlisten"]
pub struct Unlisten {
    channel: String,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Unlisten {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn unlisten(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        if let Some(list) = registry.channels.get_mut(&self.channel) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                registry.channels.remove(&self.channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collector(bus: &EventBus, channel: &str) -> (Arc<Mutex<Vec<Value>>>, Unlisten) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = bus.listen(channel, move |payload| sink.lock().push(payload.clone()));
        (seen, handle)
    }

    #[test]
    fn late_listener_sees_nothing_from_before() {
        let bus = EventBus::new();
        assert_eq!(bus.emit("backup-progress", &json!({ "current": 1 })), 0);

        let (seen, _handle) = collector(&bus, "backup-progress");
        bus.emit("backup-progress", &json!({ "current": 2 }));

        assert_eq!(*seen.lock(), vec![json!({ "current": 2 })]);
    }

    #[test]
    fn every_listener_receives_every_event() {
        let bus = EventBus::new();
        let (first, first_handle) = collector(&bus, "backup-completed");
        let (second, _second_handle) = collector(&bus, "backup-completed");

        assert_eq!(bus.emit("backup-completed", &json!(1)), 2);
        first_handle.unlisten();
        assert_eq!(bus.emit("backup-completed", &json!(2)), 1);

        assert_eq!(*first.lock(), vec![json!(1)]);
        assert_eq!(*second.lock(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn channels_are_isolated() {
        let bus = EventBus::new();
        let (seen, _handle) = collector(&bus, "backup-failed");

        bus.emit("backup-completed", &json!({}));

        assert!(seen.lock().is_empty());
    }

    #[test]
    fn dropped_handle_keeps_listening() {
        let bus = EventBus::new();
        let (seen, handle) = collector(&bus, "backup-progress");
        drop(handle);

        bus.emit("backup-progress", &json!(true));

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(bus.listener_count("backup-progress"), 1);
    }

    #[test]
    fn unlisten_is_scoped_to_one_registration() {
        let bus = EventBus::new();
        let a = bus.listen("c", |_| {});
        let _b = bus.listen("c", |_| {});
        assert_eq!(a.channel(), "c");

        a.unlisten();

        assert_eq!(bus.listener_count("c"), 1);
    }

    #[test]
    fn handler_may_register_during_emit() {
        let bus = EventBus::new();
        let inner = bus.clone();
        let _outer = bus.listen("c", move |_| {
            let _ = inner.listen("c", |_| {});
        });

        assert_eq!(bus.emit("c", &json!(null)), 1);
        assert_eq!(bus.listener_count("c"), 2);
    }
}
