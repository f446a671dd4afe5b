//! Error types for cultivate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file {path} could not be read: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid reminder time '{0}'. Use HH:MM, e.g. 06:30")]
    InvalidReminder(String),

    #[error("Invalid priority {0}. Use 1 (normal), 2 (important) or 3 (urgent)")]
    InvalidPriority(u8),

    #[error("No friend with id '{0}'")]
    UnknownFriend(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
