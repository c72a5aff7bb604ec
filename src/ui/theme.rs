use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0x7C, 0x3A, 0xED);
pub const TEXT: Color = Color::Rgb(0xF9, 0xFA, 0xFB);
pub const MUTED: Color = Color::Rgb(0x9C, 0xA3, 0xAF);
pub const DIM: Color = Color::Rgb(0x6B, 0x72, 0x80);
pub const BORDER: Color = Color::Rgb(0x37, 0x41, 0x51);
pub const ERROR: Color = Color::Rgb(0xEF, 0x44, 0x44);
pub const OK: Color = Color::Rgb(0x10, 0xB9, 0x81);

/// Badge color for a work item type. Types are service-configurable, so
/// unrecognized names fall back to a neutral color instead of failing.
pub fn type_color(name: &str) -> Color {
    match name {
        "Bug" => Color::Rgb(0xEF, 0x44, 0x44),
        "Task" => Color::Rgb(0xFB, 0xBF, 0x24),
        "User Story" | "Story" => Color::Rgb(0x60, 0xA5, 0xFA),
        "Feature" => Color::Rgb(0xA7, 0x8B, 0xFA),
        "Epic" => Color::Rgb(0xF9, 0x73, 0x16),
        _ => MUTED,
    }
}

/// Badge color for a work item state, keyed on the common state names and
/// falling back gracefully for custom ones.
pub fn state_color(name: &str) -> Color {
    match name {
        "New" | "Proposed" | "To Do" => Color::Rgb(0x60, 0xA5, 0xFA),
        "Active" | "In Progress" | "Doing" | "Committed" => Color::Rgb(0xFB, 0xBF, 0x24),
        "Resolved" => Color::Rgb(0x34, 0xD3, 0x99),
        "Closed" | "Done" | "Completed" => Color::Rgb(0x10, 0xB9, 0x81),
        "Removed" => Color::Rgb(0xEF, 0x44, 0x44),
        _ => MUTED,
    }
}

pub fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn cursor_row() -> Style {
    Style::default()
        .fg(TEXT)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn label() -> Style {
    Style::default().fg(MUTED)
}

pub fn hint() -> Style {
    Style::default().fg(DIM)
}
