//! # Course Catalog CLI (`catalog`)
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog scan` | Index the configured groups and print the result |
//! | `catalog serve` | Index the configured groups and start the HTTP API |
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use course_catalog::{config, scan, server};

/// Course Catalog — serves a directory tree of PDF courses with progress tracking.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Course Catalog — a directory-backed PDF course catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Relative group paths inside it resolve against the file's directory.
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the configured groups and print groups and items.
    ///
    /// Useful for checking the configuration before serving.
    Scan,

    /// Index the configured groups and start the HTTP server.
    Serve {
        /// Override `[server].bind` (e.g. `0.0.0.0:8000`).
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Scan => {
            scan::run_scan(&cfg)?;
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
