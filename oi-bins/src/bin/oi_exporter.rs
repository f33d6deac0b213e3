//! Option-chain open interest exporter
//!
//! Serves `<namespace>_open_interest`, `_last_price`, `_underlying_value` and
//! `_scrape_count` for every configured symbol. Each scrape of the metrics
//! path fetches a fresh option chain from NSE.

use anyhow::Result;
use clap::Parser;
use oi_bins::common::{build_provider, build_registry, install_shutdown_handler, CommonArgs};
use oi_core::utils::init_logger;
use oi_core::{MetricsServer, MetricsServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = CommonArgs::parse();

    let config = args.load_config()?;

    // Initialize logging
    init_logger(&config.logging.log_level, config.logging.json_logs)?;

    let provider = build_provider(&config)?;
    let registry = Arc::new(build_registry(&config, provider)?);

    let shutdown = install_shutdown_handler()?;

    let server_config = MetricsServerConfig::try_from(&config.server)?;

    info!(
        addr = %server_config.listen_addr,
        symbols = ?config.exporter.symbols,
        base_url = %config.provider.base_url,
        "started oi-exporter"
    );

    MetricsServer::new(server_config, registry)
        .serve(shutdown)
        .await?;

    info!("oi-exporter stopped");
    Ok(())
}
