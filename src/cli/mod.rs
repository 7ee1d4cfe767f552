//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP resource endpoint
//! - check: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_router, check, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
