use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Panel};
use crate::ui::theme;

/// Options shown per group before scrolling kicks in.
pub const MAX_VISIBLE_OPTIONS: usize = 6;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.active_panel == Panel::Filter;
    let mut lines: Vec<Line> = Vec::new();

    for (group_index, group) in app.filter.groups.iter().enumerate() {
        let is_active = focused && group_index == app.filter.active_group;

        let mut title_style = Style::default()
            .fg(theme::MUTED)
            .add_modifier(Modifier::BOLD);
        if is_active {
            title_style = title_style.fg(theme::ACCENT);
        }
        let mut title_spans = vec![Span::styled(group.title, title_style)];
        if group.options.len() > MAX_VISIBLE_OPTIONS {
            title_spans.push(Span::styled(
                format!(" ({})", group.options.len()),
                theme::hint(),
            ));
        }
        lines.push(Line::from(title_spans));

        if group.offset > 0 {
            lines.push(Line::from(Span::styled("  ▲ more", theme::hint())));
        }

        let end = (group.offset + MAX_VISIBLE_OPTIONS).min(group.options.len());
        for (option_index, option) in group.options[group.offset..end]
            .iter()
            .enumerate()
            .map(|(i, o)| (i + group.offset, o))
        {
            let is_cursor = is_active && option_index == group.cursor;
            let indicator = if option.selected { "●" } else { "○" };
            let cursor = if is_cursor { "▸" } else { " " };

            let mut style = Style::default().fg(theme::MUTED);
            if option.selected {
                style = Style::default().fg(theme::TEXT);
            }
            if is_cursor {
                style = style.fg(theme::ACCENT).add_modifier(Modifier::BOLD);
            }
            lines.push(Line::from(Span::styled(
                format!("{cursor} {indicator} {}", option.label),
                style,
            )));
        }

        if end < group.options.len() {
            lines.push(Line::from(Span::styled("  ▼ more", theme::hint())));
        }
        lines.push(Line::raw(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(" Filters ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}
