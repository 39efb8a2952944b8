//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inbox")]
#[command(about = "Unified inbox: serve the HTTP API, run a scheduled sweep, print stats", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (config from env; bind can override BIND_ADDR).
    Serve {
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Deliver every due scheduled message once and print the report as JSON.
    Sweep,
    /// Print dashboard stats (total messages, total unread) as JSON.
    Stats,
}
