//! CLI mode: scrollback window above a one-line editor.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::shell::{Shell, PROMPT};
use crate::ui::theme::SELECTED;

/// Scrollback lines visible above the input line.
pub fn scrollback_rows(height: usize) -> usize {
    height.saturating_sub(1)
}

pub fn render_cli(shell: &Shell, width: usize, height: usize) -> Vec<Line<'static>> {
    if height == 0 {
        return Vec::new();
    }
    let rows = scrollback_rows(height);
    let all = shell.scrollback.render_lines();
    let end = all.len().saturating_sub(shell.scroll_up);
    let start = end.saturating_sub(rows);

    let mut out: Vec<Line<'static>> = all[start..end]
        .iter()
        .map(|l| {
            let visible: String = l.chars().skip(shell.hscroll).take(width).collect();
            Line::from(visible)
        })
        .collect();
    while out.len() < rows {
        out.insert(0, Line::default());
    }
    out.push(input_line(shell, width));
    out
}

/// The prompt, the input text, and a block cursor drawn as a reversed cell.
fn input_line(shell: &Shell, width: usize) -> Line<'static> {
    let chars: Vec<char> = shell.input.text().chars().collect();
    let cursor = shell.input.cursor();
    // keep the cursor on screen for long input
    let room = width.saturating_sub(PROMPT.len() + 1).max(1);
    let skip = (cursor + 1).saturating_sub(room);
    let before: String = chars[skip..cursor].iter().collect();
    let at: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".into());
    let after: String = chars.iter().skip(cursor + 1).collect();
    Line::from(vec![
        Span::raw(PROMPT),
        Span::raw(before),
        Span::styled(at, SELECTED),
        Span::styled(after, Style::default()),
    ])
}
