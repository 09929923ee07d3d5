//! Diagnostic logging.
//!
//! The dashboard owns the terminal, so logs can only go to a file. They are
//! off unless `SYSDASH_LOG` names one; `RUST_LOG` sets the filter.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log file path.
pub const LOG_ENV: &str = "SYSDASH_LOG";

const DEFAULT_FILTER: &str = "info";

/// Installs the file subscriber when [`LOG_ENV`] is set.
///
/// The returned guard flushes buffered lines on drop and must outlive the
/// program's last log statement.
pub fn init() -> Result<Option<WorkerGuard>> {
    match env::var_os(LOG_ENV).map(PathBuf::from) {
        Some(path) => init_at(&path).map(Some),
        None => Ok(None),
    }
}

fn init_at(path: &Path) -> Result<WorkerGuard> {
    let appender = open_appender(path)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install log subscriber")?;

    Ok(guard)
}

/// Opens `path` for appending, creating its directory first.
fn open_appender(path: &Path) -> Result<RollingFileAppender> {
    let (dir, file) = split_log_path(path)?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file.to_string_lossy())
        .build(dir)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Splits a log path into its directory (`.` when bare) and file name.
fn split_log_path(path: &Path) -> Result<(&Path, &OsStr)> {
    let file = path
        .file_name()
        .with_context(|| format!("{LOG_ENV}={} does not name a file", path.display()))?;
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((dir, file))
}
