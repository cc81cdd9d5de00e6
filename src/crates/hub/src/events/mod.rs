//! Integration event bus.
//!
//! Events are recorded `pending` on publish and pushed onto an unbounded
//! channel. A single consumer task drains the channel in FIFO order and
//! processes one event at a time: the handler registered for the event type
//! decides between `processed` and `failed`; an event type without a handler
//! ends `unhandled`. Nothing is retried or re-queued. Each handler call runs
//! on its own task, so a panicking handler fails its event and the consumer
//! keeps going.
//!
//! The log keeps at most [`EventBusConfig::retention`] events; the oldest
//! finished events are dropped first.
//!
//! The handler table is fixed when the bus starts:
//!
//! ```rust,ignore
//! let bus = EventBus::builder()
//!     .handlers(handlers::default_handlers())
//!     .handler("invoice_paid", Arc::new(FnHandler::new(|event| Ok(event.data.clone()))))
//!     .start();
//!
//! let event = bus.publish("invoice_paid", "billing", json!({ "amount": 120 }));
//! ```

pub mod handlers;

pub use handlers::{EventHandler, FnHandler};

use crate::model::{EventStatus, IntegrationEvent};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

const PROCESSED_BROADCAST_CAPACITY: usize = 256;

/// Event bus settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Events kept in the log for lookup
    pub retention: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { retention: 10_000 }
    }
}

#[derive(Default)]
struct EventLog {
    events: HashMap<Uuid, IntegrationEvent>,
    order: VecDeque<Uuid>,
}

impl EventLog {
    /// Drop the oldest finished events until at most `retention` remain.
    /// Stops at the first event still pending.
    fn prune(&mut self, retention: usize) {
        while self.events.len() > retention {
            let Some(oldest) = self.order.front().copied() else {
                break;
            };
            match self.events.get(&oldest) {
                Some(event) if !event.status.is_terminal() => break,
                _ => {
                    self.order.pop_front();
                    self.events.remove(&oldest);
                }
            }
        }
    }
}

struct Shared {
    log: RwLock<EventLog>,
    processed: broadcast::Sender<IntegrationEvent>,
}

/// Handle to a running event bus. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<Shared>,
    queue: mpsc::UnboundedSender<Uuid>,
}

/// Collects the handler table before the consumer starts
#[derive(Default)]
pub struct EventBusBuilder {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
    config: EventBusConfig,
}

impl EventBusBuilder {
    /// Register the handler for one event type, replacing any earlier one.
    pub fn handler(mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.insert(event_type.into(), handler);
        self
    }

    /// Register a batch of handlers.
    pub fn handlers(
        mut self,
        handlers: impl IntoIterator<Item = (String, Arc<dyn EventHandler>)>,
    ) -> Self {
        self.handlers.extend(handlers);
        self
    }

    pub fn config(mut self, config: EventBusConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the consumer task. Must be called inside a tokio runtime.
    pub fn start(self) -> EventBus {
        let (queue, rx) = mpsc::unbounded_channel();
        let (processed, _) = broadcast::channel(PROCESSED_BROADCAST_CAPACITY);

        let shared = Arc::new(Shared {
            log: RwLock::new(EventLog::default()),
            processed,
        });

        info!(handlers = self.handlers.len(), "Starting event consumer");
        tokio::spawn(consume(
            rx,
            self.handlers,
            shared.clone(),
            self.config.retention.max(1),
        ));

        EventBus { shared, queue }
    }
}

impl EventBus {
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Record a `pending` event and enqueue it for the consumer.
    pub fn publish(
        &self,
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: Value,
    ) -> IntegrationEvent {
        let event = IntegrationEvent::new(event_type, source, data);

        {
            let mut log = self.shared.log.write();
            log.order.push_back(event.id);
            log.events.insert(event.id, event.clone());
        }

        debug!(event_id = %event.id, event_type = %event.event_type, "Event published");
        if self.queue.send(event.id).is_err() {
            warn!(event_id = %event.id, "Event consumer has stopped; event stays pending");
        }

        event
    }

    pub fn get_event(&self, id: &Uuid) -> Option<IntegrationEvent> {
        self.shared.log.read().events.get(id).cloned()
    }

    /// Every event, in publication order.
    pub fn events(&self) -> Vec<IntegrationEvent> {
        let log = self.shared.log.read();
        log.order
            .iter()
            .filter_map(|id| log.events.get(id).cloned())
            .collect()
    }

    /// Receive every event once its terminal status is recorded.
    pub fn subscribe_processed(&self) -> broadcast::Receiver<IntegrationEvent> {
        self.shared.processed.subscribe()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.shared.log.read().order.len())
            .finish()
    }
}

async fn consume(
    mut rx: mpsc::UnboundedReceiver<Uuid>,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
    shared: Arc<Shared>,
    retention: usize,
) {
    while let Some(id) = rx.recv().await {
        let event = shared.log.read().events.get(&id).cloned();
        let Some(event) = event else {
            continue;
        };

        let (status, result, error) = match handlers.get(&event.event_type) {
            Some(handler) => match run_handler(handler.clone(), event.clone()).await {
                Ok(result) => {
                    debug!(event_id = %id, event_type = %event.event_type, "Event processed");
                    (EventStatus::Processed, Some(result), None)
                }
                Err(e) => {
                    warn!(event_id = %id, event_type = %event.event_type, error = %e, "Event handler failed");
                    (EventStatus::Failed, None, Some(e))
                }
            },
            None => {
                warn!(event_id = %id, event_type = %event.event_type, "No handler registered for event type");
                (EventStatus::Unhandled, None, None)
            }
        };

        let finished = {
            let mut log = shared.log.write();
            let finished = log.events.get_mut(&id).map(|stored| {
                stored.status = status;
                stored.result = result;
                stored.error = error;
                stored.processed_at = Some(Utc::now());
                stored.clone()
            });
            log.prune(retention);
            finished
        };

        if let Some(event) = finished {
            let _ = shared.processed.send(event);
        }
    }

    debug!("Event consumer stopped");
}

/// Run one handler call on its own task; a panic becomes an error message.
async fn run_handler(
    handler: Arc<dyn EventHandler>,
    event: IntegrationEvent,
) -> std::result::Result<Value, String> {
    let task = tokio::spawn(async move { handler.handle(&event).await });
    match task.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.to_string()),
        Err(join) if join.is_panic() => {
            let payload = join.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("Event handler panicked: {}", message))
        }
        Err(join) => Err(format!("Event handler was cancelled: {}", join)),
    }
}
