use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme;

/// Fullscreen read-only view of the selected item. Scrolled with j/k;
/// triggers no network activity of its own.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(item) = app.list.selected() else {
        return;
    };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("#{} {}", item.id, item.title),
        Style::default()
            .fg(theme::TEXT)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw(""));

    lines.push(Line::from(Span::styled(
        "METADATA",
        Style::default()
            .fg(theme::MUTED)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(vec![
        Span::styled("Type:     ", theme::label()),
        Span::styled(
            format!("{:<14}", item.short_type()),
            Style::default().fg(theme::type_color(item.work_item_type.as_str())),
        ),
        Span::styled("Created: ", theme::label()),
        Span::raw(item.created_date.format("%Y-%m-%d").to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("State:    ", theme::label()),
        Span::styled(
            format!("{:<14}", item.state),
            Style::default().fg(theme::state_color(item.state.as_str())),
        ),
        Span::styled("Updated: ", theme::label()),
        Span::raw(item.changed_date.format("%Y-%m-%d").to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Assigned: ", theme::label()),
        Span::raw(format!(
            "{:<14}",
            item.assigned_to.as_deref().unwrap_or("Unassigned")
        )),
        Span::styled("Priority: ", theme::label()),
        Span::raw(item.priority.to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Sprint:   ", theme::label()),
        Span::raw(format!("{:<14}", item.sprint_name())),
        Span::styled("Area: ", theme::label()),
        Span::raw(item.area_name().to_string()),
    ]));

    if let Some(parent_id) = item.parent_id {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "PARENT",
            Style::default()
                .fg(theme::MUTED)
                .add_modifier(Modifier::BOLD),
        )));
        let mut parent = format!("#{parent_id}");
        if let Some(title) = &item.parent_title {
            parent.push(' ');
            parent.push_str(title);
        }
        lines.push(Line::raw(parent));
    }

    if !item.description.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "DESCRIPTION",
            Style::default()
                .fg(theme::MUTED)
                .add_modifier(Modifier::BOLD),
        )));
        for line in item.description.lines() {
            lines.push(Line::raw(line.to_string()));
        }
    }

    if !item.tags.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "TAGS",
            Style::default()
                .fg(theme::MUTED)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            item.tags.join("  "),
            Style::default().fg(theme::ACCENT),
        )));
    }

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::panel_border(true)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll as u16, 0));
    f.render_widget(body, vertical[0]);

    let hints = Paragraph::new(Line::from(Span::styled(
        " Esc back   Enter open in browser   j/k scroll",
        theme::hint(),
    )));
    f.render_widget(hints, vertical[1]);
}
