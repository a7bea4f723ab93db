//! Line protocol
//!
//! Requests are one command per line: a case-insensitive keyword followed by
//! whitespace-separated arguments. The PUBLISH message is everything after
//! the topic, internal spacing included.
//!
//! ```text
//! SUBSCRIBE <topic>
//! UNSUBSCRIBE <topic>
//! PUBLISH <topic> <message...>
//! EXIT
//! ```

use std::fmt;

use crate::utils::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Subscribe(String),
    Unsubscribe(String),
    Publish { topic: String, message: String },
    Exit,
}

/// Split off the first whitespace-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

impl Command {
    /// Parse one request line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ProtocolError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (keyword, rest) = split_token(line);
        let keyword = keyword.to_uppercase();
        let command = match keyword.as_str() {
            "SUBSCRIBE" => Self::Subscribe(Self::topic(rest, "SUBSCRIBE")?),
            "UNSUBSCRIBE" => Self::Unsubscribe(Self::topic(rest, "UNSUBSCRIBE")?),
            "PUBLISH" => {
                let (topic, message) = split_token(rest);
                if topic.is_empty() || message.is_empty() {
                    return Err(ProtocolError::PublishUsage);
                }
                Self::Publish {
                    topic: topic.to_string(),
                    message: message.to_string(),
                }
            }
            "EXIT" => Self::Exit,
            _ => return Err(ProtocolError::UnknownCommand(keyword)),
        };
        Ok(Some(command))
    }

    fn topic(rest: &str, keyword: &'static str) -> Result<String, ProtocolError> {
        match split_token(rest).0 {
            "" => Err(ProtocolError::MissingTopic(keyword)),
            topic => Ok(topic.to_string()),
        }
    }
}

/// A response line, rendered without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Subscribed(String),
    Unsubscribed(String),
    Published,
    Bye,
    Error(ProtocolError),
}

impl From<ProtocolError> for Reply {
    fn from(err: ProtocolError) -> Self {
        Self::Error(err)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscribed(topic) => write!(f, "OK subscribed to {topic}"),
            Self::Unsubscribed(topic) => write!(f, "OK unsubscribed from {topic}"),
            Self::Published => f.write_str("OK"),
            Self::Bye => f.write_str("bye"),
            Self::Error(err) => write!(f, "ERR {err}"),
        }
    }
}
