//! Enumerations for TUI state management.

use crate::settings::ReminderSlot;

/// Modal state layered over whatever page or overlay is showing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Browse,
    /// Waiting for y/n on deleting this task.
    ConfirmDelete(u64),
}

/// Which text box is receiving keystrokes, outside the create-task form.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TextTarget {
    Message,
    /// Index into the editable profile rows.
    ProfileField(usize),
    ReminderTime(ReminderSlot),
    Search,
}

/// Input mode for text entry fields.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputMode {
    None,
    Text(TextTarget),
}

/// Which list the Messages page shows.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum MessagesTab {
    Public,
    Private,
}

/// Tabs of the guide overlay.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GuideTab {
    Path,
    TaskTypes,
    Features,
}

impl GuideTab {
    pub const ALL: [GuideTab; 3] = [GuideTab::Path, GuideTab::TaskTypes, GuideTab::Features];

    pub fn label(self) -> &'static str {
        match self {
            GuideTab::Path => "修行之道",
            GuideTab::TaskTypes => "任务类型",
            GuideTab::Features => "功能详解",
        }
    }
}
