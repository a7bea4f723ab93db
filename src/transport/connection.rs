//! Connection handler
//!
//! Runs the command loop for one client. The loop ends on EXIT, end of input
//! or a read/write error; every exit path goes through `Session::close`,
//! which releases the client's subscriptions and joins its forwarders before
//! the output is shut down. A request line longer than `MAX_LINE_LENGTH`
//! counts as a read error.

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info};

use crate::broker::Broker;
use crate::client::Session;
use crate::transport::command::{Command, Reply};
use crate::utils::error::RelayError;

/// Longest request line accepted, newline excluded.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

enum Flow {
    Continue,
    Exit,
}

fn execute<W>(session: &mut Session<W>, command: Command) -> (Reply, Flow)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    match command {
        Command::Subscribe(topic) => {
            session.subscribe(&topic);
            (Reply::Subscribed(topic), Flow::Continue)
        }
        Command::Unsubscribe(topic) => match session.unsubscribe(&topic) {
            Ok(()) => (Reply::Unsubscribed(topic), Flow::Continue),
            Err(e) => (e.into(), Flow::Continue),
        },
        Command::Publish { topic, message } => {
            let delivered = session.broker().publish(&topic, &message);
            debug!(client = %session.id, topic = %topic, delivered, "published");
            (Reply::Published, Flow::Continue)
        }
        Command::Exit => (Reply::Bye, Flow::Exit),
    }
}

async fn run<R, W>(reader: R, session: &mut Session<W>) -> Result<(), RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    while let Some(line) = lines.next().await {
        let line = line?;
        let (reply, flow) = match Command::parse(&line) {
            Ok(Some(command)) => execute(session, command),
            Ok(None) => continue,
            Err(e) => (e.into(), Flow::Continue),
        };

        session.send_line(&reply.to_string()).await?;
        if let Flow::Exit = flow {
            break;
        }
    }
    Ok(())
}

/// Serve one client until it exits or disconnects.
///
/// Returns the transport error that ended the session, if any. Cleanup has
/// already happened by the time this returns.
pub async fn handle_connection<R, W>(
    reader: R,
    writer: W,
    broker: Broker,
    peer: impl Into<String>,
) -> Result<(), RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut session = Session::new(broker, writer, peer);
    info!(client = %session.id, peer = %session.peer, "client connected");

    let result = run(reader, &mut session).await;
    if let Err(e) = &result {
        debug!(client = %session.id, error = %e, "connection ended with error");
    }

    session.close().await;
    result
}
