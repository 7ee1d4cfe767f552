//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroresource serve --config <path> [--port <port>]
//! - aeroresource check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generic resource endpoint server
#[derive(Parser, Debug)]
#[command(name = "aeroresource")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a document resource over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroresource.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file and print the effective settings
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroresource.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
