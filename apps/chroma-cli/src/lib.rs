//! Chroma CLI
//!
//! Adds, lists, queries and deletes documents in a single Chroma collection.
//!
//! ## Flow
//!
//! ```text
//! flags + env ─▶ AppConfig ─▶ Session::open ─▶ command ─▶ Reporter (stdout)
//!                                   │                          │
//!                                   └──── Session::close ◀─────┘
//! ```
//!
//! Logs go to stderr; rendered results go to stdout.

pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
pub mod shutdown;

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::Result;
use tracing::debug;

use cli::Cli;
use config::AppConfig;
use render::Reporter;

/// Run one command
///
/// This is the main entry point for the binary. It:
/// 1. Installs color-eyre and structured logging (JSON for prod, compact for dev)
/// 2. Parses flags and resolves configuration once
/// 3. Starts listening for Ctrl+C / SIGTERM
/// 4. Dispatches the subcommand, rendering to stdout
pub async fn run() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();
    let config = AppConfig::from_cli_and_env(&cli.global);
    debug!(?config, "resolved configuration");

    let cancel = shutdown::listen_for_shutdown();
    let mut out = Reporter::stdout();

    commands::execute(&cli.command, &config, cancel, &mut out).await
}
