//! Tracing setup shared by the binary and the tests.

use std::str::FromStr;

use tracing::Level;

/// Resolve a configured level name. Unknown names fall back to `INFO`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "warning" => Level::WARN,
        other => Level::from_str(other).unwrap_or(Level::INFO),
    }
}

/// Install the global fmt subscriber at `level`.
///
/// Uses `try_init`, so repeated calls (tests, embedding) are no-ops.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_thread_ids(true)
        .try_init();
}
