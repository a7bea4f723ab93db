//! Per-connection session state
//!
//! The session keeps the subscriptions a connection currently holds, in the
//! order they were made, plus the join handle of every forwarder it started.
//! `close` releases whatever is still active and then waits for all of those
//! forwarders, so nothing writes to the connection after it is shut down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::broker::{Broker, Subscription};
use crate::client::forwarder::spawn_forwarder;
use crate::utils::error::ProtocolError;

/// Output stream shared between the command loop and the forwarders.
pub type SharedOutput<W> = Arc<Mutex<W>>;

/// State of one client connection: who it is, what it subscribes to, and
/// the forwarders writing to its output.
pub struct Session<W> {
    pub id: Uuid,
    pub peer: String,
    pub connected_at: DateTime<Utc>,
    broker: Broker,
    output: SharedOutput<W>,
    active: Vec<Subscription>,
    forwarders: Vec<JoinHandle<()>>,
}

impl<W> Session<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a session writing to `output`. Nothing is subscribed yet.
    pub fn new(broker: Broker, output: W, peer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer: peer.into(),
            connected_at: Utc::now(),
            broker,
            output: Arc::new(Mutex::new(output)),
            active: Vec::new(),
            forwarders: Vec::new(),
        }
    }

    /// Forwarders started by this session that `close` may still have to join.
    pub fn forwarder_count(&self) -> usize {
        self.forwarders.len()
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    /// Topics this connection is subscribed to, oldest first. A topic
    /// appears once per subscription.
    pub fn topics(&self) -> Vec<&str> {
        self.active.iter().map(Subscription::topic).collect()
    }

    /// Subscribe to `topic` and start a forwarder for the new mailbox.
    pub fn subscribe(&mut self, topic: &str) {
        let (mailbox, subscription) = self.broker.subscribe(topic);
        let handle = spawn_forwarder(mailbox, self.output.clone(), self.id);
        self.active.push(subscription);
        // Finished forwarders have nothing left to join.
        self.forwarders.retain(|h| !h.is_finished());
        self.forwarders.push(handle);
        debug!(client = %self.id, topic, "subscribed");
    }

    /// Release the oldest subscription to `topic`.
    pub fn unsubscribe(&mut self, topic: &str) -> Result<(), ProtocolError> {
        let index = self
            .active
            .iter()
            .position(|s| s.topic() == topic)
            .ok_or_else(|| ProtocolError::NotSubscribed(topic.to_string()))?;

        let subscription = self.active.remove(index);
        subscription.release();
        debug!(client = %self.id, topic, "unsubscribed");
        Ok(())
    }

    /// Write one line to the connection, serialized with forwarder output.
    pub async fn send_line(&self, line: &str) -> std::io::Result<()> {
        let mut out = self.output.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await
    }

    /// Release every remaining subscription, wait for all forwarders, then
    /// shut the output down.
    pub async fn close(mut self) {
        for subscription in self.active.drain(..) {
            subscription.release();
        }

        for result in join_all(self.forwarders.drain(..)).await {
            if let Err(e) = result {
                warn!(client = %self.id, error = %e, "forwarder task failed");
            }
        }

        if let Err(e) = self.output.lock().await.shutdown().await {
            debug!(client = %self.id, error = %e, "output shutdown failed");
        }

        let duration = Utc::now().signed_duration_since(self.connected_at);
        info!(
            client = %self.id,
            peer = %self.peer,
            duration_ms = duration.num_milliseconds(),
            "client disconnected"
        );
    }
}
