use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Details ");

    let Some(item) = app.list.selected() else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Select a work item to view details",
            theme::hint(),
        )))
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("#{} {}", item.id, item.title),
        Style::default()
            .fg(theme::TEXT)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("Type:     ", theme::label()),
        Span::styled(
            item.short_type().to_string(),
            Style::default().fg(theme::type_color(item.work_item_type.as_str())),
        ),
        Span::styled("   State: ", theme::label()),
        Span::styled(
            item.state.to_string(),
            Style::default().fg(theme::state_color(item.state.as_str())),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Assigned: ", theme::label()),
        Span::raw(item.assigned_to.as_deref().unwrap_or("Unassigned").to_string()),
        Span::styled("   Sprint: ", theme::label()),
        Span::raw(item.sprint_name().to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Area:     ", theme::label()),
        Span::raw(item.area_name().to_string()),
        Span::styled("   Priority: ", theme::label()),
        Span::raw(item.priority.to_string()),
    ]));

    if let Some(parent_id) = item.parent_id {
        let mut parent = format!("Parent: #{parent_id}");
        if let Some(title) = &item.parent_title {
            parent.push(' ');
            parent.push_str(title);
        }
        lines.push(Line::from(Span::styled(parent, theme::hint())));
    }

    if !item.description.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "─── Description ───",
            theme::hint(),
        )));
        lines.push(Line::raw(item.description.clone()));
    }

    if !item.tags.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Tags: ", theme::label()),
            Span::styled(item.tags.join(", "), Style::default().fg(theme::ACCENT)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
