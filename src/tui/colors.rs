//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::calendar::Intensity;
use crate::fields::{Category, Priority};

/// Jade, the primary accent (headers, focus borders, gauge).
pub const JADE: Color = Color::Rgb(20, 184, 166);
/// Deep teal used for the status bar background.
pub const DEEP_TEAL: Color = Color::Rgb(4, 47, 46);
/// Amber, for experience and highlights.
pub const AMBER: Color = Color::Rgb(245, 158, 11);
/// Muted slate for completed rows and secondary text.
pub const SLATE: Color = Color::Rgb(100, 116, 139);
/// Cinnabar, for destructive confirmations and urgent tasks.
pub const CINNABAR: Color = Color::Rgb(190, 40, 40);

pub fn category_color(c: Category) -> Color {
    match c {
        Category::Focus => Color::Rgb(56, 189, 248),
        Category::Physical => Color::Rgb(248, 113, 113),
        Category::Mind => Color::Rgb(167, 139, 250),
        Category::Chore => Color::Rgb(163, 163, 163),
    }
}

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Normal => SLATE,
        Priority::Important => AMBER,
        Priority::Urgent => CINNABAR,
    }
}

/// Background for a calendar cell.
pub fn intensity_color(i: Intensity) -> Color {
    match i {
        Intensity::None => Color::Rgb(15, 23, 42),
        Intensity::Low => Color::Rgb(19, 78, 74),
        Intensity::Medium => Color::Rgb(17, 94, 89),
        Intensity::High => Color::Rgb(146, 64, 14),
    }
}
