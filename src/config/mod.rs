mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENRICHMENT_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_STORE_TIMEOUT_SEC: u64 = 5;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub enrichment_url: Option<String>,
    pub enrichment_timeout_sec: u64,
    pub store_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_path: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            enrichment_url: None,
            enrichment_timeout_sec: DEFAULT_ENRICHMENT_TIMEOUT_SEC,
            store_timeout_sec: DEFAULT_STORE_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub enrichment_url: String,
    pub enrichment_timeout_sec: u64,
    pub store_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow!("db_path must be specified via --db-path, DB_PATH or in config file")
            })?;

        if db_path.is_dir() {
            bail!("db_path points to a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let enrichment_url = file
            .enrichment_url
            .or_else(|| cli.enrichment_url.clone())
            .ok_or_else(|| {
                anyhow!(
                    "enrichment_url must be specified via --enrichment-url, SWAGGER_API_URL or in config file"
                )
            })?;
        validate_enrichment_url(&enrichment_url)?;

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let enrichment_timeout_sec = file
            .enrichment_timeout_sec
            .unwrap_or(cli.enrichment_timeout_sec);
        if enrichment_timeout_sec == 0 {
            bail!("enrichment_timeout_sec must be greater than 0");
        }

        let store_timeout_sec = file.store_timeout_sec.unwrap_or(cli.store_timeout_sec);
        if store_timeout_sec == 0 {
            bail!("store_timeout_sec must be greater than 0");
        }

        Ok(Self {
            db_path,
            port,
            logging_level,
            enrichment_url,
            enrichment_timeout_sec,
            store_timeout_sec,
        })
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_sec)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_sec)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            store_timeout: self.store_timeout(),
        }
    }
}

fn validate_enrichment_url(value: &str) -> Result<()> {
    let url =
        Url::parse(value).map_err(|err| anyhow!("Invalid enrichment_url {:?}: {}", value, err))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("enrichment_url must use http or https, got {:?}", other),
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
