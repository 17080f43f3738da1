//! Structured logging module using tracing
//!
//! Logs go to stderr and, when a path is given, are appended to a log file.
//! The terminal frame is written to stdout, so the two never interleave.

use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the `-v` count to a filter level.
/// 0: error, 1: warn, 2: debug, 3+: trace.
pub fn filter_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing with console and optional file output
pub fn init_tracing(verbosity: u8, log_file_path: Option<PathBuf>) {
    // Command-line verbosity wins over RUST_LOG
    let filter = EnvFilter::new(filter_level(verbosity));

    let registry = tracing_subscriber::registry().with(filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let file = log_file_path.and_then(|log_path| {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()
    });

    if let Some(file) = file {
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false);

        registry.with(console_layer).with(file_layer).init();
    } else {
        // Console only if no path or the file could not be opened
        registry.with(console_layer).init();
    }
}
