//! The `utils` module provides definitions shared across the `linecast`
//! crate: error types and logging setup.

pub mod error;
pub mod logging;
