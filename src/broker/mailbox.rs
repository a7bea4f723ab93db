//! Mailboxes and their release handles
//!
//! `Broker::subscribe` hands out a pair: the `Mailbox` a forwarder drains and
//! the `Subscription` that removes it from the registry again. The only
//! sender for a mailbox lives in the registry, so removing the entry is what
//! ends the stream: the forwarder sees the messages already queued and then
//! `None`.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::mpsc::Receiver;
use tracing::debug;

use crate::broker::engine::TopicMap;

static NEXT_MAILBOX_ID: AtomicU64 = AtomicU64::new(1);

/// Registry-wide identity of one mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MailboxId(u64);

impl MailboxId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MAILBOX_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mbx-{}", self.0)
    }
}

/// Consumer end of a bounded per-subscription queue.
#[derive(Debug)]
pub struct Mailbox {
    id: MailboxId,
    topic: String,
    receiver: Receiver<String>,
}

impl Mailbox {
    pub(crate) fn new(id: MailboxId, topic: String, receiver: Receiver<String>) -> Self {
        Self {
            id,
            topic,
            receiver,
        }
    }

    pub fn id(&self) -> MailboxId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next message. `None` means the subscription was
    /// released and everything queued before that has been handed out.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Take a queued message without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// Number of messages waiting to be forwarded.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// One-shot release handle for a mailbox registered under a topic.
///
/// Releasing removes the mailbox from its topic, drops the topic once it has
/// no subscribers left, and closes the mailbox. Only the first call does
/// anything; dropping an unreleased handle releases it.
pub struct Subscription {
    topic: String,
    id: MailboxId,
    topics: TopicMap,
    released: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(topic: String, id: MailboxId, topics: TopicMap) -> Self {
        Self {
            topic,
            id,
            topics,
            released: AtomicBool::new(false),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mailbox_id(&self) -> MailboxId {
        self.id
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Release the subscription. Returns `true` only for the call that
    /// actually removed it.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        let sender = {
            let mut topics = self
                .topics
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let sender = topics
                .get_mut(&self.topic)
                .and_then(|topic| topic.unsubscribe(self.id));
            if topics.get(&self.topic).is_some_and(|topic| topic.is_empty()) {
                topics.remove(&self.topic);
                debug!(topic = %self.topic, "last subscriber left, topic removed");
            }
            sender
        };

        // Dropping the last sender closes the mailbox.
        drop(sender);
        debug!(topic = %self.topic, mailbox = %self.id, "subscription released");
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("mailbox", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}
