//! Lifecycle notification bus
//!
//! An explicitly constructed bus that the orchestrator publishes object and
//! bucket lifecycle events to. Each subscriber gets its own bounded queue
//! drained by a dedicated tokio task, so a slow subscriber never blocks
//! another one.

use crate::block::{BucketId, ObjectId};
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Default per-subscriber queue capacity
pub const DEFAULT_CHANNEL_SIZE: usize = 1024;

/// Event topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ObjectCreated,
    ObjectRemoved,
    ObjectAccessed,
    ObjectDownload,
    BucketCreated,
    BucketRemoved,
    BucketAccessed,
}

impl EventKind {
    /// S3-style topic name
    pub fn topic(&self) -> &'static str {
        match self {
            EventKind::ObjectCreated => "s3:ObjectCreated:*",
            EventKind::ObjectRemoved => "s3:ObjectRemoved:*",
            EventKind::ObjectAccessed => "s3:ObjectAccessed:*",
            EventKind::ObjectDownload => "s3:ObjectDownload:*",
            EventKind::BucketCreated => "s3:BucketCreated:*",
            EventKind::BucketRemoved => "s3:BucketRemoved:*",
            EventKind::BucketAccessed => "s3:BucketAccessed:*",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// A published lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub bucket_id: BucketId,
    pub object_id: Option<ObjectId>,
    /// Object size in bytes, when known
    pub size: Option<u64>,
    /// Unix timestamp (ms)
    pub timestamp: i64,
}

impl Event {
    /// Event about a bucket
    pub fn bucket(kind: EventKind, bucket_id: BucketId) -> Self {
        Self {
            kind,
            bucket_id,
            object_id: None,
            size: None,
            timestamp: crate::now_millis(),
        }
    }

    /// Event about an object
    pub fn object(kind: EventKind, bucket_id: BucketId, object_id: ObjectId, size: u64) -> Self {
        Self {
            kind,
            bucket_id,
            object_id: Some(object_id),
            size: Some(size),
            timestamp: crate::now_millis(),
        }
    }
}

type Handler = Arc<dyn Fn(Event) + Send + Sync>;

struct Subscriber {
    tx: mpsc::Sender<Event>,
    handler: Handler,
}

/// Topic-based publish/subscribe bus
pub struct EventBus {
    subscribers: RwLock<HashMap<EventKind, Vec<Subscriber>>>,
    channel_size: usize,
}

impl EventBus {
    /// Create a bus whose subscriber queues hold `channel_size` events
    pub fn new(channel_size: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            channel_size: channel_size.max(1),
        }
    }

    /// Register `handler` for `kind`.
    ///
    /// Spawns the subscriber's consumer task, so this must be called from
    /// within a tokio runtime.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Event>(self.channel_size);
        let handler: Handler = Arc::new(handler);
        let worker = handler.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                worker(event);
            }
        });

        self.subscribers
            .write()
            .entry(kind)
            .or_default()
            .push(Subscriber { tx, handler });
        debug!(topic = %kind, "Subscriber registered");
    }

    /// Queue `event` for every subscriber of its topic.
    ///
    /// Waits for queue space when a subscriber is backed up. Publishing to a
    /// topic without subscribers is a no-op.
    pub async fn publish(&self, event: Event) {
        let senders: Vec<mpsc::Sender<Event>> = {
            let subscribers = self.subscribers.read();
            match subscribers.get(&event.kind) {
                Some(subs) => subs.iter().map(|s| s.tx.clone()).collect(),
                None => return,
            }
        };

        for tx in senders {
            if tx.send(event.clone()).await.is_err() {
                debug!(topic = %event.kind, "Subscriber task gone, event dropped");
            }
        }
    }

    /// Run every handler of the event's topic inline.
    ///
    /// Fails with [`StoreError::NoSubscribers`] when nobody listens.
    pub fn publish_sync(&self, event: Event) -> Result<()> {
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .get(&event.kind)
            .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            return Err(StoreError::NoSubscribers(event.kind.topic().to_string()));
        }
        for handler in handlers {
            handler(event.clone());
        }
        Ok(())
    }

    /// Number of subscribers on a topic
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Drop every subscriber of `kind`; their consumer tasks drain and exit
    pub fn close_topic(&self, kind: EventKind) {
        self.subscribers.write().remove(&kind);
    }

    /// Drop every subscriber on every topic
    pub fn close(&self) {
        self.subscribers.write().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_SIZE)
    }
}
