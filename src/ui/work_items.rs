use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Panel};
use crate::model::item_list::{SortDirection, SortField};
use crate::ui::theme;

const ID_W: usize = 7;
const TYPE_W: usize = 8;
const STATE_W: usize = 12;
const ASSIGNED_W: usize = 14;

/// Item rows that fit: block borders plus the header line.
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3).max(1) as usize
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.active_panel == Panel::WorkItems;
    let title_w = (area.width as usize)
        .saturating_sub(ID_W + TYPE_W + STATE_W + ASSIGNED_W + 12)
        .max(10);

    let mut lines: Vec<Line> = vec![header(app, title_w)];

    if app.list.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No work items found",
            theme::hint(),
        )));
    } else {
        let visible = visible_rows(area);
        let end = (app.list.offset + visible).min(app.list.len());
        for (index, item) in app.list.items()[app.list.offset..end]
            .iter()
            .enumerate()
            .map(|(i, item)| (i + app.list.offset, item))
        {
            let assigned = item.assigned_to.as_deref().unwrap_or("-");
            let cells = [
                pad(&format!("#{}", item.id), ID_W),
                pad(item.short_type(), TYPE_W),
                pad(item.state.as_str(), STATE_W),
                pad(assigned, ASSIGNED_W),
                pad(&item.title, title_w),
            ];

            if index == app.list.cursor {
                lines.push(Line::from(Span::styled(
                    format!("▸ {}", cells.join(" ")),
                    theme::cursor_row(),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(cells[0].clone(), Style::default().fg(theme::MUTED)),
                    Span::raw(" "),
                    Span::styled(
                        cells[1].clone(),
                        Style::default().fg(theme::type_color(item.work_item_type.as_str())),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        cells[2].clone(),
                        Style::default().fg(theme::state_color(item.state.as_str())),
                    ),
                    Span::raw(" "),
                    Span::styled(cells[3].clone(), Style::default().fg(theme::MUTED)),
                    Span::raw(" "),
                    Span::styled(cells[4].clone(), Style::default().fg(theme::TEXT)),
                ]));
            }
        }
    }

    let title = format!(" Work Items ({}) ", app.list.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(title);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn header(app: &App, title_w: usize) -> Line<'static> {
    let arrow = |field: SortField| -> &'static str {
        if app.list.sort_field != field {
            return "";
        }
        match app.list.sort_direction {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    };

    let cell = |label: &str, field: Option<SortField>, width: usize| -> Span<'static> {
        let sorted = field.map(|f| app.list.sort_field == f).unwrap_or(false);
        let text = match field {
            Some(f) => format!("{label}{}", arrow(f)),
            None => label.to_string(),
        };
        let style = if sorted {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(theme::MUTED)
                .add_modifier(Modifier::BOLD)
        };
        Span::styled(pad(&text, width), style)
    };

    Line::from(vec![
        Span::raw("  "),
        cell("ID", Some(SortField::Id), ID_W),
        Span::raw(" "),
        cell("TYPE", Some(SortField::Type), TYPE_W),
        Span::raw(" "),
        cell("STATE", Some(SortField::State), STATE_W),
        Span::raw(" "),
        cell("ASSIGNED", None, ASSIGNED_W),
        Span::raw(" "),
        cell("TITLE", None, title_w),
    ])
}

fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    let mut out = if count > width && width > 3 {
        let mut truncated: String = s.chars().take(width - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        s.chars().take(width).collect()
    };
    for _ in out.chars().count()..width {
        out.push(' ');
    }
    out
}
