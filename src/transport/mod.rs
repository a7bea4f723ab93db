//! The `transport` module is responsible for the line protocol spoken over
//! TCP.
//!
//! It parses command lines, runs the per-connection command loop against the
//! broker, and owns the listener and accept loop.

pub mod command;
pub mod connection;
pub mod server;

pub use command::{Command, Reply};
pub use connection::handle_connection;
pub use server::{bind, serve};
