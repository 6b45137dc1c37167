use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use live_notifier::{
    app,
    config::{AppConfig, Args},
    logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    // Fails before any polling when credentials are missing
    let config = AppConfig::from_args(Args::parse())?;
    let _log_guard = logging::init_logging(config.log_dir.as_deref())?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for interrupt signal: {}", e),
        }
    });

    app::run(config, cancel).await?;
    info!("live-notifier stopped");

    Ok(())
}
