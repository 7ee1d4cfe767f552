//! CLI command implementations
//!
//! `serve` loads the configuration, installs logging and runs an HTTP
//! resource endpoint over an in-memory document store until Ctrl+C.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapter::{InMemoryStore, ResourceAdapter};
use crate::endpoint::{resource_router, ResourceEndpoint};
use crate::query::{IgnoredCategories, QuerySettings};
use crate::resource::Document;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 54321)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route prefix of the served resource (default: "/documents")
    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    /// Query application settings
    #[serde(default)]
    pub query: QuerySettings,

    /// Directive categories the endpoint skips
    #[serde(default)]
    pub ignored_categories: IgnoredCategories,

    /// JSON array of documents loaded into the store at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    54321
}

fn default_resource_path() -> String {
    "/documents".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            resource_path: default_resource_path(),
            query: QuerySettings::default(),
            ignored_categories: IgnoredCategories::none(),
            seed_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.query.page_size == 0 {
            return Err(CliError::config_error("query.page_size must be > 0"));
        }

        if !self.resource_path.starts_with('/') {
            return Err(CliError::config_error(format!(
                "Invalid resource_path: '{}'. It must start with '/'.",
                self.resource_path
            )));
        }

        self.socket_addr()?;
        Ok(())
    }

    /// Get the socket address to bind
    pub fn socket_addr(&self) -> CliResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CliError::config_error(format!("Invalid host/port: {}", e)))
    }

    /// Read the seed documents, if configured
    pub fn load_seed(&self) -> CliResult<Vec<Document>> {
        let Some(path) = &self.seed_file else {
            return Ok(Vec::new());
        };

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read seed file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid seed file: {}", e)))
    }
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Check { config } => check(&config),
    }
}

/// Validate a configuration file and print the effective settings
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let seeded = config.load_seed()?.len();

    let effective = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::io_error(format!("JSON error: {}", e)))?;
    println!("{}", effective);
    println!("seed documents: {}", seeded);
    Ok(())
}

/// Serve the document resource until interrupted
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }

    init_logging();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(run_server(config))
}

async fn run_server(config: Config) -> CliResult<()> {
    let addr = config.socket_addr()?;
    let app = build_router(&config)?;

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, path = %config.resource_path, "resource endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
}

/// Build the HTTP router for a document endpoint described by `config`
pub fn build_router(config: &Config) -> CliResult<Router> {
    let store = Arc::new(InMemoryStore::documents().with_entities(config.load_seed()?));
    let endpoint = ResourceEndpoint::new(ResourceAdapter::new(store))
        .with_settings(config.query.clone())
        .with_ignored(config.ignored_categories);

    Ok(resource_router(Arc::new(endpoint), &config.resource_path))
}

/// Install the fmt subscriber; `RUST_LOG` overrides the default `info` level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding process
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
