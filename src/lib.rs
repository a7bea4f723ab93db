//! # linecast
//!
//! `linecast` is a minimalist, in-memory publish/subscribe relay spoken over
//! a newline-delimited text protocol on TCP. Delivery is best effort: each
//! subscription has a small bounded mailbox, and a subscriber that falls
//! behind loses new messages instead of slowing publishers down.
//!
//! ## Core Modules
//!
//! - `broker`: the topic registry, mailboxes and their release handles.
//! - `client`: per-connection sessions and the forwarder tasks that write
//!   published messages back to the client.
//! - `config`: loading server configuration from file and environment.
//! - `transport`: command parsing, the connection handler and the TCP server.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use broker::Broker;
