//! Broker engine
//!
//! The in-memory registry mapping topic names to subscribed mailboxes.
//!
//! Concurrency notes:
//! - The map sits behind a reader/writer lock. `publish` takes the shared
//!   side, so fan-outs run in parallel with each other; subscribe and
//!   release take the exclusive side.
//! - Publishing never waits on a mailbox. Each enqueue is a `try_send`, and
//!   a full mailbox loses the message for that subscriber alone.
//! - A publish racing with a release sees the subscriber either fully
//!   present or fully gone, never in between.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::broker::mailbox::{Mailbox, MailboxId, Subscription};
use crate::broker::topic::Topic;

/// Messages a mailbox holds before further publishes are dropped.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 16;

/// Largest mailbox capacity accepted; larger requests are clamped.
pub const MAX_MAILBOX_CAPACITY: usize = 65_536;

pub(crate) type TopicMap = Arc<RwLock<HashMap<String, Topic>>>;

/// The topic registry. Clones share the same topics.
#[derive(Debug, Clone)]
pub struct Broker {
    topics: TopicMap,
    capacity: usize,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    /// Create an empty broker with `DEFAULT_MAILBOX_CAPACITY` mailboxes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Create a broker whose mailboxes hold `capacity` messages, clamped to
    /// `1..=MAX_MAILBOX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.clamp(1, MAX_MAILBOX_CAPACITY),
        }
    }

    /// Messages each mailbox holds before publishes to it are dropped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Topic>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Topic>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a fresh mailbox under `topic`, creating the topic if needed.
    pub fn subscribe(&self, topic: &str) -> (Mailbox, Subscription) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = MailboxId::next();

        {
            let mut topics = self.write();
            topics
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic))
                .subscribe(id, tx);
        }
        debug!(topic, mailbox = %id, "mailbox registered");

        (
            Mailbox::new(id, topic.to_string(), rx),
            Subscription::new(topic.to_string(), id, self.topics.clone()),
        )
    }

    /// Offer `message` to every mailbox subscribed to `topic`.
    ///
    /// Returns the number of mailboxes that accepted it. An unknown topic or
    /// a set of full mailboxes is not an error.
    pub fn publish(&self, topic: &str, message: &str) -> usize {
        let topics = self.read();
        match topics.get(topic) {
            Some(t) => {
                let delivered = t.publish(message);
                trace!(
                    topic,
                    delivered,
                    subscribers = t.subscriber_count(),
                    "message published"
                );
                delivered
            }
            None => {
                trace!(topic, "no subscribers, message discarded");
                0
            }
        }
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.read().contains_key(topic)
    }

    pub fn topic_count(&self) -> usize {
        self.read().len()
    }

    /// Number of mailboxes registered under `topic` (zero if absent).
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read().get(topic).map_or(0, Topic::subscriber_count)
    }

    /// Snapshot of the topic names currently present.
    pub fn topics(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub(crate) fn is_registered(&self, topic: &str, id: MailboxId) -> bool {
        self.read()
            .get(topic)
            .is_some_and(|t| t.subscribers.contains_key(&id))
    }
}
