//! snaptask-relay: local relay for browser clients.
//!
//! Holds the provider token and forwards `/ocr` and `/caption` requests
//! upstream so browsers avoid cross-origin restrictions.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use snaptask::Config;

/// Local inference relay for browser clients.
#[derive(Parser)]
#[command(name = "snaptask-relay")]
#[command(version = snaptask::PKG_VERSION)]
#[command(about = "Local inference relay for browser clients")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides config and AI_PROXY_PORT).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.relay.bind = bind;
    }

    info!(version = snaptask::PKG_VERSION, "snaptask-relay starting");
    snaptask::relay::serve(&config).await?;

    Ok(())
}
