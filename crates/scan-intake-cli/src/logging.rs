use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/scan-intake.log";
const DEFAULT_FILTER: &str = "scan_intake=info,scan_intake_core=info";

/// Split a log file path into the directory the appender writes to and the
/// file name. A bare file name lands in the working directory.
fn log_target(path: &str) -> (PathBuf, String) {
    let path = Path::new(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan-intake.log".to_string());
    (dir, file)
}

/// Terminal layer writes to stderr; the file layer records every session.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (dir, file) = log_target(&log_file_path);
    let file_appender = tracing_appender::rolling::never(&dir, &file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_thread_ids(true),
        )
        .with(filter_layer)
        .init();

    debug!("Logging scans to {}", dir.join(&file).display());

    guard
}
