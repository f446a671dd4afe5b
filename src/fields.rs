//! Enumerations and field types for cultivation tasks.
//!
//! This module defines the structured data types used to categorise tasks and
//! drive the interface: task categories, priority weights, pages, overlays and
//! visibility levels.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The four fixed practice categories a task can belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// 灵识任务, deep-focus work.
    Focus,
    /// 体修任务, exercise and body training.
    Physical,
    /// 心法任务, study and reading.
    Mind,
    /// 杂务, chores and errands.
    Chore,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Focus,
        Category::Physical,
        Category::Mind,
        Category::Chore,
    ];

    /// Short English label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Focus => "Focus",
            Category::Physical => "Physical",
            Category::Mind => "Mind",
            Category::Chore => "Chore",
        }
    }

    /// Themed name shown next to the label.
    pub fn themed_name(self) -> &'static str {
        match self {
            Category::Focus => "灵识任务",
            Category::Physical => "体修任务",
            Category::Mind => "心法任务",
            Category::Chore => "杂务",
        }
    }

    /// One-line description used by the create form.
    pub fn description(self) -> &'static str {
        match self {
            Category::Focus => "focused work",
            Category::Physical => "body training",
            Category::Mind => "study and reading",
            Category::Chore => "daily chores",
        }
    }
}

/// Spiritual weight of a task: normal (1), important (2) or urgent (3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Normal,
    Important,
    Urgent,
}

impl Priority {
    /// All priorities from lowest to highest.
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::Important, Priority::Urgent];

    /// Numeric weight in `1..=3`.
    pub fn weight(self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Important => 2,
            Priority::Urgent => 3,
        }
    }

    /// Map a numeric weight back to a priority.
    pub fn from_weight(weight: u8) -> Option<Priority> {
        match weight {
            1 => Some(Priority::Normal),
            2 => Some(Priority::Important),
            3 => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::Important => "Important",
            Priority::Urgent => "Urgent",
        }
    }

    /// Rune marks, one per weight point.
    pub fn runes(self) -> &'static str {
        match self {
            Priority::Normal => "◆",
            Priority::Important => "◆◆",
            Priority::Urgent => "◆◆◆",
        }
    }
}

/// Top-level pages reachable from the bottom tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    Calendar,
    Friends,
    Messages,
    Profile,
}

impl Page {
    /// Tab order of the navigation bar.
    pub const TABS: [Page; 5] = [
        Page::Home,
        Page::Calendar,
        Page::Friends,
        Page::Messages,
        Page::Profile,
    ];

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Practice",
            Page::Calendar => "Calendar",
            Page::Friends => "Friends",
            Page::Messages => "Messages",
            Page::Profile => "Profile",
        }
    }

    /// Position of this page in [`Page::TABS`].
    pub fn index(self) -> usize {
        Page::TABS.iter().position(|p| *p == self).unwrap_or(0)
    }
}

/// Which settings screen is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPage {
    Privacy,
    Reminder,
    Notification,
}

impl SettingsPage {
    pub const ALL: [SettingsPage; 3] = [
        SettingsPage::Privacy,
        SettingsPage::Reminder,
        SettingsPage::Notification,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsPage::Privacy => "Privacy",
            SettingsPage::Reminder => "Practice Reminders",
            SettingsPage::Notification => "Notifications",
        }
    }
}

/// Screens drawn over the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    CreateTask,
    UserCenter,
    Settings(SettingsPage),
    AddFriend,
    Guide,
}

/// Audience allowed to see profile or task information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    Friends,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Friends, Visibility::Private];

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Friends => "Friends only",
            Visibility::Private => "Private",
        }
    }

    /// Next value in the cycle public → friends → private → public.
    pub fn next(self) -> Visibility {
        match self {
            Visibility::Public => Visibility::Friends,
            Visibility::Friends => Visibility::Private,
            Visibility::Private => Visibility::Public,
        }
    }
}

/// Completion filter for task listings.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompletionFilter {
    All,
    Pending,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_weight_roundtrip_bounds() {
        assert_eq!(Priority::from_weight(0), None);
        assert_eq!(Priority::from_weight(4), None);
        for p in Priority::ALL {
            assert_eq!(Priority::from_weight(p.weight()), Some(p));
        }
    }

    #[test]
    fn test_exactly_four_categories() {
        assert_eq!(Category::ALL.len(), 4);
        assert_eq!(serde_json::to_string(&Category::Physical).unwrap(), "\"physical\"");
    }

    #[test]
    fn test_visibility_cycle() {
        let mut v = Visibility::Public;
        for _ in 0..3 {
            v = v.next();
        }
        assert_eq!(v, Visibility::Public);
    }

    #[test]
    fn test_page_index_matches_tab_order() {
        assert_eq!(Page::Home.index(), 0);
        assert_eq!(Page::Profile.index(), 4);
    }
}
