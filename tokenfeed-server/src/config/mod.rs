//! Configuration module for tokenfeed-server.
//!
//! Handles loading configuration from TOML files and CLI arguments, and
//! turning it into the typed settings consumed by the pipeline.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{
    BroadcastConfig, EnricherConfig, PacerConfig, ServerConfig, UpstreamConfig,
};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub pacer: PacerConfig,
    pub enricher: EnricherConfig,
    pub broadcast: BroadcastConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides, validate, and build the
    /// loaded configuration.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    ///
    /// Only the pacer settings are applied to the running pipeline.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let upstream = Url::parse(&config.upstream.url).map_err(|e| {
        ConfigError::ValidationError(format!("invalid upstream url {}: {e}", config.upstream.url))
    })?;
    if !matches!(upstream.scheme(), "ws" | "wss") {
        return Err(ConfigError::ValidationError(format!(
            "upstream url must use ws:// or wss://, got {}",
            config.upstream.url
        )));
    }

    if config.pacer.period_ms == 0 {
        return Err(ConfigError::ValidationError(
            "pacer.period_ms must be greater than zero".to_string(),
        ));
    }

    if config.enricher.gateways.is_empty() {
        return Err(ConfigError::ValidationError(
            "enricher.gateways must list at least one gateway".to_string(),
        ));
    }
    for gateway in config
        .enricher
        .gateways
        .iter()
        .chain(std::iter::once(&config.enricher.canonical_image_base))
    {
        Url::parse(gateway).map_err(|e| {
            ConfigError::ValidationError(format!("invalid gateway url {gateway}: {e}"))
        })?;
    }
    if config.enricher.description_cap == 0 {
        return Err(ConfigError::ValidationError(
            "enricher.description_cap must be greater than zero".to_string(),
        ));
    }
    if config.enricher.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "enricher.fetch_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.broadcast.channel_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "broadcast.channel_capacity must be greater than zero".to_string(),
        ));
    }
    if config.broadcast.report_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "broadcast.report_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let FileConfig {
        server,
        upstream,
        pacer,
        enricher,
        broadcast,
    } = file_config;

    LoadedConfig {
        server: ServerConfig {
            listen: server.listen,
        },
        upstream: UpstreamConfig {
            url: upstream.url,
            reconnect_delay: Duration::from_secs(upstream.reconnect_delay_secs),
        },
        pacer: PacerConfig {
            period: Duration::from_millis(pacer.period_ms),
            frame_style: broadcast.frame_style,
        },
        enricher: EnricherConfig {
            gateways: enricher.gateways,
            canonical_image_base: enricher.canonical_image_base,
            description_cap: enricher.description_cap,
            fetch_timeout: Duration::from_secs(enricher.fetch_timeout_secs),
        },
        broadcast: BroadcastConfig {
            channel_capacity: broadcast.channel_capacity,
            report_interval: Duration::from_secs(broadcast.report_interval_secs),
        },
    }
}
