//! Common utilities for all binaries
//!
//! Shared CLI parsing, configuration layering, collector wiring and
//! shutdown handling.

use anyhow::{Context, Result};
use clap::Parser;
use oi_core::config::Config;
use oi_core::{CollectorRegistry, NseClient, OptionChainCollector, SnapshotProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Common CLI arguments for all binaries
///
/// Flags override the config file and `OI_EXPORTER__*` environment values.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Symbol to export (repeat for several)
    #[arg(short, long = "symbol")]
    pub symbols: Vec<String>,

    /// Listen address (`host:port`, or `:port` for all interfaces)
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Metric name prefix
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Base URL of the option-chain API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl CommonArgs {
    /// Apply CLI overrides on top of a loaded config
    pub fn apply(&self, config: &mut Config) {
        if !self.symbols.is_empty() {
            config.exporter.symbols = self.symbols.clone();
        }
        if let Some(addr) = &self.addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.exporter.namespace = namespace.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.provider.base_url = base_url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level = level.clone();
        }
        if self.json_logs {
            config.logging.json_logs = true;
        }
    }

    /// Load file + environment, then apply flags and re-validate
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// One collector per configured symbol, all sharing `provider`
pub fn build_registry(
    config: &Config,
    provider: Arc<dyn SnapshotProvider>,
) -> Result<CollectorRegistry> {
    let mut registry = CollectorRegistry::new();

    for symbol in &config.exporter.symbols {
        let collector =
            OptionChainCollector::new(&config.exporter.namespace, symbol.clone(), provider.clone())
                .with_context(|| format!("Failed to create collector for {}", symbol))?;
        registry
            .register(Arc::new(collector))
            .with_context(|| format!("Failed to register collector for {}", symbol))?;
    }

    info!(
        namespace = %config.exporter.namespace,
        symbols = ?config.exporter.symbols,
        "collectors registered"
    );

    Ok(registry)
}

/// NSE provider built from the `provider` config section
pub fn build_provider(config: &Config) -> Result<Arc<dyn SnapshotProvider>> {
    let client = NseClient::from_config(&config.provider).context("Failed to create NSE client")?;
    Ok(Arc::new(client))
}

/// Install a Ctrl+C / SIGTERM handler that flips the returned channel to `true`
pub fn install_shutdown_handler() -> Result<watch::Receiver<bool>> {
    let (tx, rx) = watch::channel(false);

    ctrlc::set_handler(move || {
        warn!("Received shutdown signal, initiating graceful shutdown...");
        let _ = tx.send(true);
    })
    .context("Failed to install signal handler")?;

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oi_core::testing::{scenario_snapshot, ScriptedProvider};
    use oi_core::MetricsServerConfig;

    #[test]
    fn test_cli_overrides() {
        let args = CommonArgs::try_parse_from([
            "oi-exporter",
            "--symbol",
            "NIFTY",
            "-s",
            "FINNIFTY",
            "--addr",
            "127.0.0.1:9999",
            "--json-logs",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.exporter.symbols, vec!["NIFTY", "FINNIFTY"]);
        assert_eq!(config.server.listen_addr, "127.0.0.1:9999");
        assert!(config.logging.json_logs);
        // Not given on the command line
        assert_eq!(config.exporter.namespace, "oi_exporter");
    }

    #[test]
    fn test_bare_port_addr_flag() {
        let args = CommonArgs::try_parse_from(["oi-exporter", "--addr", ":9100"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        let server = MetricsServerConfig::try_from(&config.server).unwrap();
        assert_eq!(server.listen_addr.to_string(), "0.0.0.0:9100");
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = CommonArgs::try_parse_from(["oi-exporter"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.exporter.symbols, vec!["BANKNIFTY"]);
        assert!(!config.logging.json_logs);
    }

    #[test]
    fn test_build_registry_one_collector_per_symbol() {
        let mut config = Config::default();
        config.exporter.symbols = vec!["NIFTY".to_string(), "BANKNIFTY".to_string()];

        let provider: Arc<dyn SnapshotProvider> =
            Arc::new(ScriptedProvider::always_ok(scenario_snapshot()));
        let registry = build_registry(&config, provider).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_build_registry_rejects_bad_namespace() {
        let mut config = Config::default();
        config.exporter.namespace = "oi-exporter".to_string();

        let provider: Arc<dyn SnapshotProvider> =
            Arc::new(ScriptedProvider::always_ok(scenario_snapshot()));
        assert!(build_registry(&config, provider).is_err());
    }
}
