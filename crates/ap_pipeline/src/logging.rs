use std::collections::VecDeque;
use std::path::Path;
use std::sync::Once;

use ap_core::{Error, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Prefixes every message, e.g. with the cycle number.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }
}

/// Non-blocking writer appending to `path`, parent directories created.
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("Log path {} has no file name", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)
        .map_err(|e| Error::Storage(format!("Cannot open {}: {}", path.display(), e)))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber: stdout, plus `log_file` without colors
/// when given. Keep the returned guard alive until exit so buffered lines
/// reach the file. Later calls install nothing and return `None`.
pub fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let mut guard = None;
    INIT.call_once(|| {
        if tracing::dispatcher::has_been_set() {
            return;
        }

        let mut file_error = None;
        let file_layer = match log_file.map(file_writer) {
            Some(Ok((writer, worker))) => {
                guard = Some(worker);
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(writer),
                )
            }
            Some(Err(e)) => {
                file_error = Some(e);
                None
            }
            None => None,
        };

        let _ = tracing_subscriber::registry()
            .with(LevelFilter::INFO)
            .with(fmt::layer().with_target(false))
            .with(file_layer)
            .try_init();

        if let Some(e) = file_error {
            tracing::warn!("⚠️ Logging to stdout only: {}", e);
        }
    });
    guard
}
