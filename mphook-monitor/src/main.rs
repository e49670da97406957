//! mphook monitor
//!
//! Watches the mempool.space websocket feed and fires webhooks when
//! configured trigger rules match.

mod config;
mod shutdown;

use clap::Parser;
use config::ConfigLoader;
use mphook_core::events::webhook_job_channel;
use mphook_core::processors::{ConnectionManager, TriggerEngine, WebhookSender};
use shutdown::spawn_shutdown_handler;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// mphook - Bitcoin mempool event monitor with webhook triggers
#[derive(Parser, Debug)]
#[command(name = "mphook-monitor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the feed websocket URL (e.g., wss://mempool.space/api/v1/ws)
    #[arg(long, env = "MPHOOK_FEED_URL")]
    feed_url: Option<Url>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting mphook-monitor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration, falling back to defaults
    let config_loader = ConfigLoader::new(&args.config, args.feed_url);
    let config = config_loader.load_or_default();
    tracing::info!(
        path = ?config_loader.config_path(),
        feed = %config.feed_url,
        webhooks = config.webhooks.len(),
        triggers = config.triggers.len(),
        "Configuration loaded"
    );
    if config.triggers.is_empty() {
        tracing::warn!("No triggers configured, no webhooks will fire");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (job_tx, job_rx) = webhook_job_channel();

    // Webhook delivery runs on its own task so the feed loop never waits on it
    let sender = WebhookSender::new(config.webhooks.clone());
    let sender_handle = tokio::spawn(sender.run(job_rx, shutdown_rx.clone()));

    // Spawn the SIGINT/SIGTERM handler
    let signal_handle = spawn_shutdown_handler(shutdown_tx);

    let engine = TriggerEngine::new(config.triggers.clone(), job_tx);
    let manager = ConnectionManager::new(&config, engine);
    manager.run(shutdown_rx).await;

    sender_handle.await?;
    signal_handle.abort();

    tracing::info!("Monitor shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn,tungstenite=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
