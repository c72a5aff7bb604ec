pub mod detail_view;
pub mod details;
pub mod filter_panel;
pub mod help;
pub mod modals;
pub mod theme;
pub mod work_items;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Panel, View};

pub struct MainLayout {
    pub title: Rect,
    pub filter: Rect,
    pub items: Rect,
    pub details: Rect,
    pub status: Rect,
}

pub fn main_layout(area: Rect) -> MainLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title bar
            Constraint::Min(6),    // panels
            Constraint::Length(1), // status bar
        ])
        .split(area);

    let filter_width = (area.width / 5).max(20);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(filter_width), Constraint::Min(30)])
        .split(vertical[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(horizontal[1]);

    MainLayout {
        title: vertical[0],
        filter: horizontal[0],
        items: right[0],
        details: right[1],
        status: vertical[2],
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if app.view == View::Detail {
        detail_view::render(f, area, app);
        return;
    }

    let layout = main_layout(area);
    render_title_bar(f, layout.title, app);
    filter_panel::render(f, layout.filter, app);
    work_items::render(f, layout.items, app);
    details::render(f, layout.details, app);
    render_status_bar(f, layout.status, app);

    if app.help_visible {
        help::render(f, area);
    }
    if app.modal.is_some() {
        modals::render(f, area, app);
    }
}

fn render_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "boards",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}/{}", app.organization, app.project),
            theme::label(),
        ),
    ];

    if app.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Loading...", theme::hint()));
    }
    if let Some(error) = &app.error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            error.clone(),
            Style::default().fg(theme::ERROR),
        ));
    }
    if let Some((status, _)) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(theme::OK)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel = match app.active_panel {
        Panel::Filter => "Filter",
        Panel::WorkItems => "Work Items",
    };
    let mut spans = vec![
        Span::styled("Panel: ", theme::hint()),
        Span::styled(panel, theme::label()),
        Span::raw("  "),
    ];
    for (key, desc) in [
        ("Tab", "panel"),
        ("j/k", "move"),
        ("Enter", "open"),
        ("v", "view"),
        ("s", "state"),
        ("a", "assign"),
        ("b", "branch"),
        ("?", "help"),
    ] {
        spans.push(Span::styled(format!(" {key}"), theme::label()));
        spans.push(Span::styled(format!(":{desc} "), theme::hint()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A centered popup rect, clamped to the containing area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
