//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single
//! practice item, and `NewTask`, the set of fields a caller supplies when
//! creating one.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::fields::*;

/// A user-created practice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub category: Category,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub reminder: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
    pub date: NaiveDate,
}

impl Task {
    /// Whether the task repeats daily.
    pub fn repeats(&self) -> bool {
        self.repeat.unwrap_or(false)
    }

    /// Reminder formatted as `HH:MM`, or `-`.
    pub fn reminder_label(&self) -> String {
        format_reminder(self.reminder)
    }
}

/// Fields supplied by the create form. Id, completion and date are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub reminder: Option<NaiveTime>,
    pub repeat: Option<bool>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, category: Category, priority: Priority) -> Self {
        NewTask {
            title: title.into(),
            category,
            priority,
            reminder: None,
            repeat: None,
        }
    }

    pub fn with_reminder(mut self, reminder: Option<NaiveTime>) -> Self {
        self.reminder = reminder;
        self
    }

    /// A `false` flag is stored as absent.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = if repeat { Some(true) } else { None };
        self
    }
}

/// Parse a reminder time of day. Blank input means no reminder.
pub fn parse_reminder(input: &str) -> Result<Option<NaiveTime>> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map(Some)
        .map_err(|_| AppError::InvalidReminder(s.to_string()))
}

/// Format an optional reminder as `HH:MM`.
pub fn format_reminder(reminder: Option<NaiveTime>) -> String {
    match reminder {
        Some(t) => t.format("%H:%M").to_string(),
        None => "-".into(),
    }
}

/// Serde adapter storing reminders as `HH:MM` strings.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reminder() {
        assert_eq!(parse_reminder("  ").unwrap(), None);
        assert_eq!(
            parse_reminder("06:00").unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0)
        );
        assert!(parse_reminder("25:00").is_err());
        assert!(parse_reminder("soon").is_err());
    }

    #[test]
    fn test_repeat_false_is_absent() {
        let t = NewTask::new("x", Category::Chore, Priority::Normal).with_repeat(false);
        assert_eq!(t.repeat, None);
        let t = t.with_repeat(true);
        assert_eq!(t.repeat, Some(true));
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: 3,
            title: "炼体功法一百式".into(),
            category: Category::Physical,
            completed: false,
            priority: Priority::Important,
            reminder: NaiveTime::from_hms_opt(6, 0, 0),
            repeat: None,
            date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["reminder"], "06:00");
        assert_eq!(json["category"], "physical");
        assert!(json.get("repeat").is_none());

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }
}
