//! Forwarder tasks
//!
//! One task per active subscription: drain the mailbox and write each
//! message as a line to the connection. The task ends when the mailbox is
//! closed by its release handle, or on the first failed write.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::broker::Mailbox;

/// Spawn the forwarder for `mailbox`, writing to the shared `output`.
///
/// The returned handle completes once the mailbox is closed and drained,
/// or after the first failed write.
pub fn spawn_forwarder<W>(
    mut mailbox: Mailbox,
    output: Arc<Mutex<W>>,
    client_id: Uuid,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut forwarded = 0usize;
        while let Some(message) = mailbox.recv().await {
            let line = format!("{message}\n");
            let mut out = output.lock().await;
            let written = match out.write_all(line.as_bytes()).await {
                Ok(()) => out.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                debug!(
                    client = %client_id,
                    topic = mailbox.topic(),
                    error = %e,
                    "write failed, forwarder stopping"
                );
                return;
            }
            forwarded += 1;
        }
        debug!(
            client = %client_id,
            topic = mailbox.topic(),
            mailbox = %mailbox.id(),
            forwarded,
            "forwarder finished"
        );
    })
}
