//! TOML configuration.
//!
//! Every key is optional; a missing file section falls back to the values the
//! session starts with when no `--config` is given.
//!
//! ```toml
//! [session]
//! date_policy = "fixed"      # or "today"
//! fixed_date = "2025-11-22"
//!
//! [progression]
//! completion_reward = 60
//! completion_delay_ms = 800
//!
//! [logging]
//! level = "warn"
//! file = "/tmp/cultivate.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::settings::{NotificationSettings, PrivacySettings, ReminderSettings};
use crate::store::DEFAULT_COMPLETION_REWARD;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub progression: ProgressionConfig,
    pub logging: LoggingConfig,
    pub privacy: PrivacySettings,
    pub reminder: ReminderSettings,
    pub notification: NotificationSettings,
}

/// How the session decides which date counts as "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePolicy {
    /// Always use `fixed_date`.
    Fixed,
    /// Use the local calendar date at startup.
    Today,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub date_policy: DatePolicy,
    pub fixed_date: NaiveDate,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            date_policy: DatePolicy::Fixed,
            fixed_date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl SessionConfig {
    /// The date new tasks are filed under.
    pub fn resolve_today(&self) -> NaiveDate {
        match self.date_policy {
            DatePolicy::Fixed => self.fixed_date,
            DatePolicy::Today => Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub completion_reward: u64,
    /// Delay before a completion shows in the TUI.
    pub completion_delay_ms: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        ProgressionConfig {
            completion_reward: DEFAULT_COMPLETION_REWARD,
            completion_delay_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".into(),
            file: None,
        }
    }
}

impl Config {
    /// Parse a config document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let contents = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Visibility;

    #[test]
    fn test_empty_document_is_default() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.progression.completion_reward, 60);
        assert_eq!(cfg.progression.completion_delay_ms, 800);
        assert_eq!(
            cfg.session.resolve_today(),
            NaiveDate::from_ymd_opt(2025, 11, 22).unwrap()
        );
    }

    #[test]
    fn test_partial_sections() {
        let cfg = Config::from_toml(
            r#"
[session]
fixed_date = "2026-01-05"

[progression]
completion_reward = 100

[privacy]
task_visibility = "private"
"#,
        )
        .unwrap();
        assert_eq!(cfg.session.date_policy, DatePolicy::Fixed);
        assert_eq!(cfg.session.fixed_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(cfg.progression.completion_reward, 100);
        assert_eq!(cfg.progression.completion_delay_ms, 800);
        assert_eq!(cfg.privacy.task_visibility, Visibility::Private);
        assert!(cfg.privacy.show_level);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn test_today_policy_parses() {
        let cfg = Config::from_toml("[session]\ndate_policy = \"today\"\n").unwrap();
        assert_eq!(cfg.session.date_policy, DatePolicy::Today);
    }

    #[test]
    fn test_bad_value_is_error() {
        assert!(Config::from_toml("[progression]\ncompletion_reward = \"lots\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/cultivate.toml"))).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }
}
