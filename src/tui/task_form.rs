//! Create-task form for the terminal user interface.
//!
//! Text fields (title, reminder) take typed characters; selectors (category,
//! priority) cycle with left/right; the repeat switch flips with left/right or
//! space.

use crate::error::Result;
use crate::fields::{Category, Priority};
use crate::task::{parse_reminder, NewTask};
use crate::tui::input::InputField;

/// Field order in the form.
pub const TITLE_ORDER: usize = 0;
pub const CATEGORY_ORDER: usize = 1;
pub const PRIORITY_ORDER: usize = 2;
pub const REMINDER_ORDER: usize = 3;
pub const REPEAT_ORDER: usize = 4;

const FIELD_COUNT: usize = 5;

/// State of the create-task form.
pub struct TaskForm {
    pub title: InputField,
    pub reminder: InputField,
    pub category: usize,
    pub priority: usize,
    pub repeat: bool,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Empty form: focus category, normal priority, title focused.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            reminder: InputField::new(),
            category: 0,
            priority: 0,
            repeat: false,
            current_field: TITLE_ORDER,
        };
        form.update_active_field();
        form
    }

    pub fn selected_category(&self) -> Category {
        Category::ALL[self.category % Category::ALL.len()]
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    /// Whether submit should be offered at all.
    pub fn can_submit(&self) -> bool {
        !self.title.value.trim().is_empty()
    }

    /// Build the new task. Fails only on a malformed reminder.
    pub fn to_new_task(&self) -> Result<NewTask> {
        let reminder = parse_reminder(&self.reminder.value)?;
        Ok(NewTask::new(self.title.value.trim(), self.selected_category(), self.selected_priority())
            .with_reminder(reminder)
            .with_repeat(self.repeat))
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_ORDER;
        self.reminder.active = self.current_field == REMINDER_ORDER;
    }

    /// The text field that has focus, if any.
    pub fn active_input(&self) -> Option<&InputField> {
        match self.current_field {
            TITLE_ORDER => Some(&self.title),
            REMINDER_ORDER => Some(&self.reminder),
            _ => None,
        }
    }

    fn active_input_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_ORDER => Some(&mut self.title),
            REMINDER_ORDER => Some(&mut self.reminder),
            _ => None,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        match self.current_field {
            REMINDER_ORDER if !(c.is_ascii_digit() || c == ':') => {}
            REPEAT_ORDER if c == ' ' => self.repeat = !self.repeat,
            _ => {
                if let Some(field) = self.active_input_mut() {
                    field.handle_char(c);
                }
            }
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input_mut() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input_mut() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            CATEGORY_ORDER => self.category = cycle(self.category, Category::ALL.len(), right),
            PRIORITY_ORDER => self.priority = cycle(self.priority, Priority::ALL.len(), right),
            REPEAT_ORDER => self.repeat = !self.repeat,
            _ => {
                if let Some(field) = self.active_input_mut() {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }
}

fn cycle(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn type_str(form: &mut TaskForm, s: &str) {
        for c in s.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_blank_title_cannot_submit() {
        let mut form = TaskForm::new();
        assert!(!form.can_submit());
        type_str(&mut form, "   ");
        assert!(!form.can_submit());
    }

    #[test]
    fn test_fill_and_build() {
        let mut form = TaskForm::new();
        type_str(&mut form, "站桩");
        form.next_field();
        form.handle_left_right(true);
        form.handle_left_right(true);
        form.next_field();
        form.handle_left_right(false);
        form.next_field();
        type_str(&mut form, "06:3a0");
        form.next_field();
        form.handle_char(' ');

        let new = form.to_new_task().unwrap();
        assert_eq!(new.title, "站桩");
        assert_eq!(new.category, Category::Mind);
        assert_eq!(new.priority, Priority::Urgent);
        assert_eq!(new.reminder.map(|t| t.format("%H:%M").to_string()), Some("06:30".into()));
        assert_eq!(new.repeat, Some(true));
    }

    #[test]
    fn test_bad_reminder_is_rejected() {
        let mut form = TaskForm::new();
        type_str(&mut form, "x");
        form.current_field = REMINDER_ORDER;
        type_str(&mut form, "25:00");
        assert!(matches!(form.to_new_task(), Err(AppError::InvalidReminder(_))));
    }

    #[test]
    fn test_field_cycle_wraps() {
        let mut form = TaskForm::new();
        form.prev_field();
        assert_eq!(form.current_field, REPEAT_ORDER);
        form.next_field();
        assert_eq!(form.current_field, TITLE_ORDER);
        assert!(form.title.active);
    }
}
