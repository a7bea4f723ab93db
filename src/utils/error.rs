//! Error types used within `linecast`.
//!
//! `ProtocolError` covers client mistakes. They are reported back on the
//! connection as `ERR <text>` and leave the connection usable.
//! `RelayError` covers everything that stops a connection or the process.

use std::io;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("missing topic for {0}")]
    MissingTopic(&'static str),

    #[error("usage: PUBLISH <topic> <message>")]
    PublishUsage,

    #[error("not subscribed to {0}")]
    NotSubscribed(String),

    #[error("unknown command {0}")]
    UnknownCommand(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connection i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("request line longer than {max} bytes")]
    LineTooLong { max: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<LinesCodecError> for RelayError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => Self::LineTooLong {
                max: crate::transport::connection::MAX_LINE_LENGTH,
            },
            LinesCodecError::Io(e) => Self::Io(e),
        }
    }
}
