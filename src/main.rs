//! `linecast` server binary.
//!
//! ```text
//! linecast            # listen on the configured port (default 9000)
//! linecast 9100       # override the port
//! ```

use clap::Parser;
use linecast::Broker;
use linecast::config::load_config_from;
use linecast::transport::{bind, serve};
use linecast::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "linecast", about = "In-memory pub/sub relay over a line protocol")]
struct Cli {
    /// Port to listen on, overriding configuration
    port: Option<u16>,

    /// Configuration file, without extension
    #[arg(long, default_value = "config/default")]
    config: String,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut settings = match load_config_from(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    logging::init(&settings.log.level);

    let listener = match bind(&settings.address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let broker = Broker::with_capacity(settings.broker.capacity);

    tokio::select! {
        _ = serve(listener, broker) => {
            error!("Accept loop exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }
}
