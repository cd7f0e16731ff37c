//! Forwarded echo server.
//!
//! Answers every request with the client-origin metadata it carried, as a
//! backend behind the same proxies would see it.
//!
//! ```text
//!     Client ──▶ proxy ──▶ ┌──────────────────────────────────────────┐
//!                          │ TraceLayer → TimeoutLayer                │
//!                          │   → remote_addr_middleware               │
//!                          │       (Forwarded, then X-Forwarded-*)    │
//!                          │   → echo handler → JSON                  │
//!                          └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forwarded_echo::config::{load_config, override_bind_address, EchoConfig};
use forwarded_echo::lifecycle::{signals, Shutdown};
use forwarded_echo::observability::{logging, metrics};
use forwarded_echo::EchoServer;

#[derive(Parser)]
#[command(name = "forwarded-echo")]
#[command(about = "Echo server reporting Forwarded / X-Forwarded-* metadata", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EchoConfig::default(),
    };
    if let Some(bind) = args.bind {
        config = override_bind_address(config, bind)?;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("forwarded-echo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = ?args.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    EchoServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
