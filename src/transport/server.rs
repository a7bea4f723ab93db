//! TCP listener and accept loop.

use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::broker::Broker;
use crate::transport::connection::handle_connection;
use crate::utils::error::RelayError;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Bind the listening socket. Failure here is fatal for the binary.
pub async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Accept clients forever, one task per connection.
pub async fn serve(listener: TcpListener, broker: Broker) {
    if let Ok(addr) = listener.local_addr() {
        info!("linecast listening on {addr}");
    }

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept error");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let broker = broker.clone();
        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            match handle_connection(reader, writer, broker, peer.to_string()).await {
                Ok(()) => debug!(%peer, "connection closed"),
                Err(RelayError::Io(e)) => debug!(%peer, error = %e, "connection dropped"),
                Err(e) => warn!(%peer, error = %e, "connection terminated"),
            }
        });
    }
}
