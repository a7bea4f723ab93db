//! The `client` module holds the per-connection side of the relay.
//!
//! A `Session` owns one connection's subscriptions and the forwarder tasks
//! that push their messages out to the socket.

pub mod forwarder;
pub mod session;

pub use forwarder::spawn_forwarder;
pub use session::{SharedOutput, Session};

#[cfg(test)]
mod tests;
