//! Topic management
//!
//! A `Topic` holds the sending half of every mailbox subscribed to one
//! topic name. Callers must hold the broker lock while touching it: shared
//! for `publish`, exclusive for `subscribe` and `unsubscribe`.

use std::collections::HashMap;

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

use crate::broker::mailbox::MailboxId;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashMap<MailboxId, Sender<String>>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
        }
    }

    /// Register a mailbox sender under this topic.
    pub fn subscribe(&mut self, id: MailboxId, sender: Sender<String>) {
        self.subscribers.insert(id, sender);
    }

    /// Remove a mailbox from the topic, handing back its sender.
    pub fn unsubscribe(&mut self, id: MailboxId) -> Option<Sender<String>> {
        self.subscribers.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Offer `message` to every mailbox without waiting.
    ///
    /// A full mailbox drops the message for that subscriber only. Returns
    /// how many mailboxes accepted it.
    pub fn publish(&self, message: &str) -> usize {
        let mut delivered = 0;
        for (id, sender) in &self.subscribers {
            match sender.try_send(message.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    trace!(topic = %self.name, mailbox = %id, "mailbox full, message dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(topic = %self.name, mailbox = %id, "forwarder gone, message dropped");
                }
            }
        }
        delivered
    }
}
