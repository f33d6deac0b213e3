pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File, FileFormat};
use std::collections::HashSet;
use std::path::Path;

/// Prefix of environment overrides, e.g. `OI_EXPORTER__SERVER__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "OI_EXPORTER";

impl Config {
    /// Load configuration from an optional TOML file with environment variable overrides
    ///
    /// Missing keys fall back to the serde defaults in [`types`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigLoader::builder();

        // Load from TOML file
        if let Some(config_path) = path {
            builder = builder.add_source(File::from(config_path).format(FileFormat::Toml));
        }

        let config = builder
            // Override with environment variables (OI_EXPORTER__)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("exporter.symbols")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        // Deserialize into Config struct
        let cfg: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.exporter.namespace.is_empty() {
            anyhow::bail!("exporter.namespace must not be empty");
        }

        if self.exporter.symbols.is_empty() {
            anyhow::bail!("exporter.symbols must contain at least one symbol");
        }

        let mut seen = HashSet::new();
        for symbol in &self.exporter.symbols {
            if symbol.trim().is_empty() {
                anyhow::bail!("exporter.symbols contains a blank symbol");
            }
            if !seen.insert(symbol.as_str()) {
                anyhow::bail!("Duplicate symbol '{}' in exporter.symbols", symbol);
            }
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "Invalid provider.base_url '{}', must start with http:// or https://",
                self.provider.base_url
            );
        }

        if self.provider.request_timeout_secs == 0 {
            anyhow::bail!("provider.request_timeout_secs must be positive");
        }

        if self.server.scrape_timeout_secs == 0 {
            anyhow::bail!("server.scrape_timeout_secs must be positive");
        }

        let path = self.server.metrics_path.as_str();
        if !path.starts_with('/') || path == "/" || path == "/health" || path == "/healthz" {
            anyhow::bail!(
                "Invalid server.metrics_path '{}', must start with '/' and not shadow / or /health",
                path
            );
        }

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}', must be one of: {:?}",
                self.logging.log_level,
                valid_log_levels
            );
        }

        Ok(())
    }
}
