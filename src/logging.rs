//! Tracing setup. The terminal belongs to the UI, so logs go to a file.

use std::error::Error;
use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Install a global subscriber writing to `log_file`, filtered by `RUST_LOG`
/// (default `info`). Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(log_file: &Path) -> Result<WorkerGuard, Box<dyn Error>> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = log_file
        .file_name()
        .ok_or_else(|| format!("log path {} has no file name", log_file.display()))?;
    fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;

    Ok(guard)
}
