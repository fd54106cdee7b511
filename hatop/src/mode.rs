//! Screen modes, mode switching, and per-view scroll/selection state.

use std::fmt;

use crate::store::Snapshot;
use crate::types::ServiceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    Help,
    #[default]
    Status,
    Traffic,
    Http,
    Errors,
    Cli,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Help,
        Mode::Status,
        Mode::Traffic,
        Mode::Http,
        Mode::Errors,
        Mode::Cli,
    ];

    /// Modes reachable with the number keys, in key order (1..=5).
    pub fn from_number(n: u32) -> Option<Mode> {
        match n {
            1 => Some(Mode::Status),
            2 => Some(Mode::Traffic),
            3 => Some(Mode::Http),
            4 => Some(Mode::Errors),
            5 => Some(Mode::Cli),
            _ => None,
        }
    }

    pub fn number(self) -> Option<u32> {
        match self {
            Mode::Help => None,
            Mode::Status => Some(1),
            Mode::Traffic => Some(2),
            Mode::Http => Some(3),
            Mode::Errors => Some(4),
            Mode::Cli => Some(5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Help => "HELP",
            Mode::Status => "STATUS",
            Mode::Traffic => "TRAFFIC",
            Mode::Http => "HTTP",
            Mode::Errors => "ERRORS",
            Mode::Cli => "CLI",
        }
    }

    pub fn is_table(self) -> bool {
        matches!(self, Mode::Status | Mode::Traffic | Mode::Http | Mode::Errors)
    }

    fn index(self) -> usize {
        Mode::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current mode plus exactly one remembered prior mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeState {
    current: Mode,
    previous: Option<Mode>,
    read_only: bool,
}

impl ModeState {
    pub fn new(initial: Mode, read_only: bool) -> Self {
        let current = if read_only && initial == Mode::Cli {
            Mode::Status
        } else {
            initial
        };
        Self {
            current,
            previous: None,
            read_only,
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn previous(&self) -> Option<Mode> {
        self.previous
    }

    pub fn allows(&self, mode: Mode) -> bool {
        !(self.read_only && mode == Mode::Cli)
    }

    /// Switch to `mode`; returns false if it is unavailable.
    pub fn jump(&mut self, mode: Mode) -> bool {
        if !self.allows(mode) {
            return false;
        }
        if mode != self.current {
            self.previous = Some(self.current);
            self.current = mode;
        }
        true
    }

    pub fn cycle_forward(&mut self) {
        self.step(1);
    }

    pub fn cycle_backward(&mut self) {
        self.step(Mode::ALL.len() - 1);
    }

    fn step(&mut self, by: usize) {
        let n = Mode::ALL.len();
        let mut i = self.current.index();
        loop {
            i = (i + by) % n;
            if self.allows(Mode::ALL[i]) {
                break;
            }
        }
        self.jump(Mode::ALL[i]);
    }

    /// Toggle back to the mode active before the last switch.
    pub fn jump_previous(&mut self) {
        if let Some(prev) = self.previous {
            self.jump(prev);
        }
    }
}

/// Clamp a vertical or horizontal offset to `[0, max(0, total - visible)]`.
pub fn clamp_offset(offset: usize, total: usize, visible: usize) -> usize {
    offset.min(total.saturating_sub(visible))
}

/// Scroll position and selected row of a table view.
///
/// The selection is owned by identity and re-resolved against every new
/// snapshot; the index is a cache of where that identity was last seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub scroll: usize,
    pub selected: Option<ServiceId>,
    pub selected_index: usize,
}

impl ViewState {
    /// Re-resolve the selection in a fresh snapshot.
    ///
    /// Keeps the identity when it still exists; otherwise falls back to the
    /// same index clamped to the new row count.
    pub fn reselect(&mut self, snap: &Snapshot) {
        let count = snap.service_count();
        if count == 0 {
            self.selected = None;
            self.selected_index = 0;
            return;
        }
        if let Some(pos) = self.selected.as_ref().and_then(|id| snap.position(id)) {
            self.selected_index = pos;
            return;
        }
        self.selected_index = self.selected_index.min(count - 1);
        self.selected = snap.nth(self.selected_index).map(|s| s.id());
    }

    /// Move the selection by `delta` rows, clamped to the snapshot.
    pub fn move_selection(&mut self, snap: &Snapshot, delta: isize) {
        let count = snap.service_count();
        if count == 0 {
            self.selected = None;
            self.selected_index = 0;
            return;
        }
        let base = if self.selected.is_some() {
            self.selected_index as isize
        } else if delta >= 0 {
            -1
        } else {
            count as isize
        };
        let idx = (base + delta).clamp(0, count as isize - 1) as usize;
        self.select_index(snap, idx);
    }

    pub fn select_index(&mut self, snap: &Snapshot, idx: usize) {
        let count = snap.service_count();
        if count == 0 {
            return;
        }
        self.selected_index = idx.min(count - 1);
        self.selected = snap.nth(self.selected_index).map(|s| s.id());
    }

    pub fn scroll_by(&mut self, delta: isize, total: usize, visible: usize) {
        let next = (self.scroll as isize + delta).max(0) as usize;
        self.scroll = clamp_offset(next, total, visible);
    }

    /// Adjust the scroll offset so `line` is inside the visible window.
    pub fn reveal(&mut self, line: usize, total: usize, visible: usize) {
        if visible == 0 {
            return;
        }
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + visible {
            self.scroll = line + 1 - visible;
        }
        self.scroll = clamp_offset(self.scroll, total, visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_six_times_is_identity() {
        for start in Mode::ALL {
            let mut st = ModeState::new(start, false);
            for _ in 0..6 {
                st.cycle_forward();
            }
            assert_eq!(st.current(), start);
        }
    }

    #[test]
    fn backward_wraps_from_help_to_cli() {
        let mut st = ModeState::new(Mode::Help, false);
        st.cycle_backward();
        assert_eq!(st.current(), Mode::Cli);
    }

    #[test]
    fn previous_toggles_between_last_two() {
        let mut st = ModeState::new(Mode::Status, false);
        st.jump(Mode::Traffic);
        st.jump(Mode::Errors);
        st.jump_previous();
        assert_eq!(st.current(), Mode::Traffic);
        st.jump_previous();
        assert_eq!(st.current(), Mode::Errors);
    }

    #[test]
    fn read_only_skips_cli() {
        let mut st = ModeState::new(Mode::Cli, true);
        assert_eq!(st.current(), Mode::Status);
        assert!(!st.jump(Mode::Cli));
        st.jump(Mode::Errors);
        st.cycle_forward();
        assert_eq!(st.current(), Mode::Help);
    }

    #[test]
    fn clamp_offset_bounds() {
        assert_eq!(clamp_offset(10, 5, 20), 0);
        assert_eq!(clamp_offset(10, 25, 20), 5);
        assert_eq!(clamp_offset(3, 25, 20), 3);
    }

    #[test]
    fn reveal_keeps_line_visible() {
        let mut v = ViewState::default();
        v.reveal(30, 50, 10);
        assert_eq!(v.scroll, 21);
        v.reveal(5, 50, 10);
        assert_eq!(v.scroll, 5);
    }
}
