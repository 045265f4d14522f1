use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songs_catalog_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_ENRICHMENT_TIMEOUT_SEC, DEFAULT_PORT,
    DEFAULT_STORE_TIMEOUT_SEC,
};
use songs_catalog_server::{run_server, EnrichmentClient, RequestsLoggingLevel, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };

    if original_path.is_absolute() {
        return Ok(original_path);
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite songs database file. Created if missing.
    #[clap(long, env = "DB_PATH", value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "API_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the song details lookup service.
    #[clap(long, env = "SWAGGER_API_URL")]
    pub enrichment_url: Option<String>,

    /// Timeout in seconds for a single details lookup.
    #[clap(long, default_value_t = DEFAULT_ENRICHMENT_TIMEOUT_SEC)]
    pub enrichment_timeout_sec: u64,

    /// Timeout in seconds for a single database operation.
    #[clap(long, default_value_t = DEFAULT_STORE_TIMEOUT_SEC)]
    pub store_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            enrichment_url: self.enrichment_url.clone(),
            enrichment_timeout_sec: self.enrichment_timeout_sec,
            store_timeout_sec: self.store_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so env-backed arguments see the .env values.
    let dotenv_result = dotenvy::dotenv();

    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(err) if err.not_found() => debug!("No .env file found"),
        Err(err) => warn!("Failed to load .env file: {}", err),
    }

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite songs database at {:?}...", config.db_path);
    let song_store = Arc::new(SqliteSongStore::new(
        &config.db_path,
        config.store_timeout(),
    )?);

    info!("Song details lookup service at {}", config.enrichment_url);
    let details_provider = Arc::new(EnrichmentClient::new(
        &config.enrichment_url,
        config.enrichment_timeout(),
    )?);

    info!("Starting server on port {}...", config.port);
    run_server(config.server_config(), song_store, details_provider).await
}
