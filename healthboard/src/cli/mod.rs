//! CLI module for healthboard
//!
//! Provides the command-line interface for the dashboard server.

pub mod serve;

use clap::{Parser, Subcommand};

/// healthboard - HTTP health-check dashboard service
#[derive(Parser, Debug)]
#[command(name = "healthboard")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    HEALTHBOARD_HOST                 Bind address (default: 0.0.0.0)
    HEALTHBOARD_PORT                 Listen port (default: 8787)
    HEALTHBOARD_LOG                  Log filter (default: info)
    HEALTHBOARD_DATABASE_URL         Database URL
    HEALTHBOARD_POLL_INTERVAL_SECS   Poll interval per endpoint (default: 60)
    HEALTHBOARD_PROBE_TIMEOUT_MS     Per-probe request timeout (default: 5000)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(serve::ServeArgs),
}
