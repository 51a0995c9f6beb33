use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::{EventBatch, HttpGateway};
use crate::types::Result;

use super::bus::EventBus;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Anything that can be long-polled for backend events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events with an id greater than `since`, waiting up to `timeout` for one to arrive.
    async fn poll_events(&self, since: u64, timeout: Duration) -> Result<EventBatch>;
}

#[async_trait]
impl EventSource for HttpGateway {
    async fn poll_events(&self, since: u64, timeout: Duration) -> Result<EventBatch> {
        HttpGateway::poll_events(self, since, timeout).await
    }
}

/// Moves events from an [`EventSource`] onto an [`EventBus`].
///
/// The pump starts at the backend's current position: events that happened
/// before it started are never published.
pub struct EventPump {
    source: Arc<dyn EventSource>,
    bus: EventBus,
    poll_timeout: Duration,
    shutdown: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl EventPump {
    pub fn new(source: Arc<dyn EventSource>, bus: EventBus, poll_timeout: Duration) -> Self {
        Self {
            source,
            bus,
            poll_timeout,
            shutdown: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn spawn(self) -> PumpHandle {
        let shutdown = Arc::clone(&self.shutdown);
        let wake = Arc::clone(&self.wake);
        let task = tokio::spawn(async move { self.run().await });
        PumpHandle {
            shutdown,
            wake,
            task,
        }
    }

    pub async fn run(&self) {
        info!(timeout_secs = self.poll_timeout.as_secs(), "Event pump started");
        let mut cursor: Option<u64> = None;
        let mut backoff = INITIAL_BACKOFF;

        while !self.shutdown.load(Ordering::SeqCst) {
            let outcome = tokio::select! {
                _ = self.wake.notified() => break,
                outcome = self.step(&mut cursor) => outcome,
            };

            match outcome {
                Ok(published) => {
                    backoff = INITIAL_BACKOFF;
                    if published > 0 {
                        debug!(published, cursor = ?cursor, "Published backend events");
                    }
                }
                Err(err) => {
                    warn!(error = ?err, retry_in = ?backoff, "Event poll failed");
                    tokio::select! {
                        _ = self.wake.notified() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
        info!("Event pump stopped");
    }

    async fn step(&self, cursor: &mut Option<u64>) -> Result<usize> {
        let Some(since) = *cursor else {
            let batch = self.source.poll_events(0, Duration::ZERO).await?;
            *cursor = Some(batch.last_event_id);
            return Ok(0);
        };

        let batch = self.source.poll_events(since, self.poll_timeout).await?;
        for event in &batch.events {
            self.bus.emit(&event.channel, &event.payload);
        }
        *cursor = Some(batch.last_event_id);
        Ok(batch.events.len())
    }
}

/// Control handle for a spawned [`EventPump`].
pub struct PumpHandle {
    shutdown: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PumpHandle {
    /// Ask the pump to stop and wait for it to finish.
    pub async fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.wake.notify_one();
        if let Err(err) = self.task.await {
            warn!(error = ?err, "Event pump task ended abnormally");
        }
    }
}
