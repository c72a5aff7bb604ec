use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Modal};
use crate::modals::{AssignModal, BranchModal, StateModal};
use crate::ui::{centered_rect, theme};

const ASSIGN_VISIBLE: usize = 8;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    match &app.modal {
        Some(Modal::State(modal)) => render_state(f, area, modal),
        Some(Modal::Assign(modal)) => render_assign(f, area, modal),
        Some(Modal::Branch(modal)) => render_branch(f, area, modal),
        None => {}
    }
}

fn popup(f: &mut Frame, area: Rect, title: &str, width: u16, height: u16) -> Rect {
    let rect = centered_rect(width, height, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(format!(" {title} "));
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    inner
}

fn item_header(id: i32, title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("#{id} {}", truncate(title, 40)),
        theme::label(),
    ))
}

fn render_state(f: &mut Frame, area: Rect, modal: &StateModal) {
    let height = (modal.states.len() as u16) + 7;
    let inner = popup(f, area, "Change State", 44, height);

    let mut lines = vec![
        item_header(modal.item.id, &modal.item.title),
        Line::from(Span::styled(
            format!("Current: {}", modal.item.state),
            Style::default().fg(theme::state_color(modal.item.state.as_str())),
        )),
        Line::raw(""),
    ];

    for (index, state) in modal.states.iter().enumerate() {
        let cursor = if index == modal.cursor { "▸ " } else { "  " };
        let mut style = Style::default().fg(theme::TEXT);
        if state == modal.item.state.as_str() {
            style = Style::default().fg(theme::OK);
        }
        if index == modal.cursor {
            style = style.fg(theme::ACCENT).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(vec![
            Span::raw(cursor.to_string()),
            Span::styled(state.clone(), style),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Enter: confirm  Esc: cancel",
        theme::hint(),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_assign(f: &mut Frame, area: Rect, modal: &AssignModal) {
    let inner = popup(f, area, "Assign To", 52, (ASSIGN_VISIBLE as u16) + 9);

    let mut lines = vec![
        item_header(modal.item.id, &modal.item.title),
        Line::from(Span::styled(
            format!(
                "Current: {}",
                modal.item.assigned_to.as_deref().unwrap_or("Unassigned")
            ),
            theme::label(),
        )),
    ];

    if modal.filtering {
        lines.push(Line::from(vec![
            Span::styled("Filter: ", theme::label()),
            Span::styled(
                format!("{}█", modal.filter),
                Style::default().fg(theme::TEXT),
            ),
        ]));
    } else {
        lines.push(Line::from(Span::styled("Press / to filter", theme::hint())));
    }
    lines.push(Line::raw(""));

    if modal.filtered.is_empty() {
        lines.push(Line::from(Span::styled("  No members found", theme::hint())));
    } else {
        // Keep the cursor inside the window.
        let offset = modal.cursor.saturating_sub(ASSIGN_VISIBLE - 1);
        let end = (offset + ASSIGN_VISIBLE).min(modal.filtered.len());
        for (index, member) in modal.filtered[offset..end]
            .iter()
            .enumerate()
            .map(|(i, m)| (i + offset, m))
        {
            let cursor = if index == modal.cursor { "▸ " } else { "  " };
            let mut style = Style::default().fg(theme::TEXT);
            if modal.item.assigned_to.as_deref() == Some(member.display_name.as_str()) {
                style = Style::default().fg(theme::OK);
            }
            if index == modal.cursor {
                style = style.fg(theme::ACCENT).add_modifier(Modifier::BOLD);
            }
            lines.push(Line::from(vec![
                Span::raw(cursor.to_string()),
                Span::styled(truncate(&member.display_name, 40), style),
            ]));
        }
        if modal.filtered.len() > ASSIGN_VISIBLE {
            lines.push(Line::from(Span::styled(
                format!("  ({}/{})", modal.cursor + 1, modal.filtered.len()),
                theme::hint(),
            )));
        }
    }

    lines.push(Line::raw(""));
    let hint = if modal.filtering {
        "Enter: confirm  Esc: clear/close"
    } else {
        "Enter: confirm  /: filter  Esc: cancel"
    };
    lines.push(Line::from(Span::styled(hint, theme::hint())));
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_branch(f: &mut Frame, area: Rect, modal: &BranchModal) {
    let inner = popup(f, area, "Create Branch", 54, 9);

    let mut lines = vec![
        item_header(modal.item.id, &modal.item.title),
        Line::raw(""),
        Line::from(Span::styled("Branch name:", theme::label())),
        Line::from(Span::styled(
            format!("{}█", modal.input),
            Style::default().fg(theme::TEXT),
        )),
    ];

    if let Some(error) = &modal.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme::ERROR),
        )));
    } else {
        lines.push(Line::raw(""));
    }

    lines.push(Line::from(Span::styled(
        "Enter: create  Esc: cancel",
        theme::hint(),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
