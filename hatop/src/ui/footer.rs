//! Bottom bar: mode tabs, key hints and the last notice.

use ratatui::text::{Line, Span};

use crate::mode::{Mode, ModeState};
use crate::ui::theme::{BAR, BAR_BOLD, BOLD};

pub fn footer_line(modes: &ModeState, notice: Option<&str>, width: usize) -> Line<'static> {
    let mut spans = Vec::new();
    let mut used = 0;
    for mode in Mode::ALL {
        let Some(n) = mode.number() else { continue };
        if !modes.allows(mode) {
            continue;
        }
        let tab = format!(" {n}-{} ", mode.name());
        used += tab.len();
        let style = if modes.current() == mode { BOLD } else { BAR_BOLD };
        spans.push(Span::styled(tab, style));
    }
    let hint = match notice {
        Some(n) => format!(" {n}"),
        None => " TAB=MODE UP/DOWN=SELECT H=HELP Q=QUIT".to_string(),
    };
    used += hint.chars().count();
    spans.push(Span::styled(hint, BAR));
    spans.push(Span::styled(" ".repeat(width.saturating_sub(used)), BAR));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(l: &Line<'_>) -> String {
        l.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn read_only_hides_cli_tab() {
        let rw = footer_line(&ModeState::new(Mode::Status, false), None, 80);
        let ro = footer_line(&ModeState::new(Mode::Status, true), None, 80);
        assert!(text(&rw).contains("5-CLI"));
        assert!(!text(&ro).contains("5-CLI"));
    }

    #[test]
    fn notice_replaces_hints() {
        let l = footer_line(&ModeState::new(Mode::Status, false), Some("no selection"), 80);
        assert!(text(&l).contains("no selection"));
        assert!(!text(&l).contains("Q=QUIT"));
    }
}
