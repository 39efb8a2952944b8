//! Tracing setup for the server and CLI.
//!
//! Two fmt layers share one filter: stdout keeps ANSI colours, the log file gets plain text.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Used when `RUST_LOG` is unset or does not parse. HTTP and SQL internals stay at warn.
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,sqlx=warn,hyper=warn,reqwest=warn";

/// Installs the global subscriber. Load `.env` first so `RUST_LOG` is visible.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = open_log_file(Path::new(log_file_path))?;
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE);

    Registry::default()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    tracing::info!(log_file = %log_file_path, "Logging initialised");
    Ok(())
}

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
