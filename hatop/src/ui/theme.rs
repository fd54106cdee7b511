//! Shared UI theme constants.

use ratatui::style::{Color, Modifier, Style};

use crate::types::Status;

pub const BAR: Style = Style::new().add_modifier(Modifier::REVERSED);
pub const BAR_BOLD: Style = Style::new()
    .add_modifier(Modifier::REVERSED)
    .add_modifier(Modifier::BOLD);
pub const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
pub const SELECTED: Style = Style::new().add_modifier(Modifier::REVERSED);

pub const LIVE: Color = Color::Green;
pub const STALE: Color = Color::Yellow;
pub const UNREACHABLE: Color = Color::Red;

pub fn status_style(status: &Status) -> Style {
    let fg = match status {
        Status::Up | Status::Open => Color::Green,
        Status::Down | Status::Full => Color::Red,
        Status::GoingDown(_) | Status::GoingUp(_) | Status::NoLb => Color::Yellow,
        Status::Maint | Status::MaintVia => Color::Magenta,
        Status::NoCheck | Status::Unknown | Status::Other(_) => Color::Reset,
    };
    Style::default().fg(fg)
}
