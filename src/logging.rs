//! `tracing` subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{AppError, Result};

/// Where log lines go for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands write to stderr.
    Stderr,
    /// The TUI owns the terminal; only a file is safe.
    FileOnly,
}

fn filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logging(e.to_string()))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// With [`LogTarget::FileOnly`] and no file, nothing is installed.
pub fn init(config: &LoggingConfig, file: Option<&Path>, target: LogTarget) -> Result<()> {
    let file = file.or(config.file.as_deref());
    let filter = filter(&config.level)?;

    match (file, target) {
        (Some(path), _) => {
            let out = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(out))
                .try_init()
                .map_err(|e| AppError::Logging(e.to_string()))
        }
        (None, LogTarget::Stderr) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| AppError::Logging(e.to_string())),
        (None, LogTarget::FileOnly) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_is_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(filter("cultivate=notalevel"), Err(AppError::Logging(_))));
    }

    #[test]
    fn test_tui_without_file_installs_nothing() {
        let cfg = LoggingConfig::default();
        assert!(init(&cfg, None, LogTarget::FileOnly).is_ok());
    }
}
