//! Input field handling for the terminal user interface.

use ratatui::text::Span;

/// A single-line text field. `cursor` counts characters, not bytes, so
/// editing in the middle of CJK text is safe.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            active: false,
        }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len_chars() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len_chars() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Take the contents, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Terminal columns before the cursor, measured the way ratatui lays
    /// text out: wide characters take two, combining marks take none.
    pub fn cursor_column(&self) -> u16 {
        let end = self.byte_index(self.cursor);
        let width = Span::raw(&self.value[..end]).width();
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace_ascii() {
        let mut f = InputField::new();
        for c in "abc".chars() {
            f.handle_char(c);
        }
        f.move_cursor_left();
        f.handle_backspace();
        assert_eq!(f.value, "ac");
        assert_eq!(f.cursor, 1);
    }

    #[test]
    fn test_cjk_editing_is_char_safe() {
        let mut f = InputField::with_value("打坐冥想");
        assert_eq!(f.cursor, 4);
        f.move_cursor_left();
        f.move_cursor_left();
        f.handle_char('与');
        assert_eq!(f.value, "打坐与冥想");
        f.handle_backspace();
        f.handle_delete();
        assert_eq!(f.value, "打坐想");
        assert_eq!(f.cursor, 2);
        assert_eq!(f.cursor_column(), 4);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut f = InputField::with_value("x");
        f.move_cursor_right();
        assert_eq!(f.cursor, 1);
        f.handle_delete();
        assert_eq!(f.value, "x");
        f.move_cursor_left();
        f.move_cursor_left();
        assert_eq!(f.cursor, 0);
        f.handle_backspace();
        assert_eq!(f.value, "x");
    }

    #[test]
    fn test_take_empties() {
        let mut f = InputField::with_value("道友好");
        assert_eq!(f.take(), "道友好");
        assert!(f.value.is_empty());
        assert_eq!(f.cursor, 0);
    }

    #[test]
    fn test_cursor_column_skips_zero_width() {
        assert_eq!(InputField::with_value("e\u{301}").cursor_column(), 1);
        assert_eq!(InputField::with_value("a\u{200d}b").cursor_column(), 2);

        let mut f = InputField::with_value("cafe\u{301}好");
        assert_eq!(f.cursor_column(), 6);
        f.move_cursor_left();
        assert_eq!(f.cursor_column(), 4);
        f.move_cursor_left();
        assert_eq!(f.cursor_column(), 4);
    }
}
