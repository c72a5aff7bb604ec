use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::{centered_rect, theme};

const BINDINGS: &[(&str, &str)] = &[
    ("↑/k  ↓/j", "move cursor"),
    ("←/h  →/l", "switch filter group"),
    ("g / G", "jump to top / bottom"),
    ("Tab / Shift+Tab", "switch panel"),
    ("Enter / Space", "select filter option"),
    ("Enter", "open item in browser"),
    ("v", "view item details"),
    ("s", "change state"),
    ("a", "assign"),
    ("b", "create branch"),
    ("1 / 2 / 3", "sort by id / type / state"),
    ("Ctrl+r", "refresh"),
    ("?", "toggle help"),
    ("Esc", "back / cancel"),
    ("q", "quit"),
];

pub fn render(f: &mut Frame, area: Rect) {
    let height = (BINDINGS.len() as u16) + 4;
    let rect = centered_rect(46, height, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(" Help ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut lines: Vec<Line> = vec![Line::raw("")];
    for (keys, desc) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:<18}"), Style::default().fg(theme::ACCENT)),
            Span::styled(*desc, theme::label()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), inner);
}
