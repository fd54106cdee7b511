//! UI module root: one viewport per mode, key routing, and frame layout.

pub mod cli;
pub mod columns;
pub mod footer;
pub mod header;
pub mod help;
pub mod table;
pub mod theme;
pub mod util;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::SessionState;
use crate::hotkey::Hotkey;
use crate::mode::{clamp_offset, Mode, ViewState};
use crate::store::{Snapshot, Store};
use crate::ui::columns::columns_for;
use crate::ui::header::HEADER_ROWS;
use crate::ui::table::{line_of_service, table_lines};
use crate::ui::theme::{BAR_BOLD, BOLD};

pub const MIN_WIDTH: u16 = 78;
pub const MIN_HEIGHT: u16 = 20;

/// What the event loop has to do after a key was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// State changed (or nothing to do); redraw.
    Handled,
    Ignored,
    Refresh,
    Quit,
    Hotkey(Hotkey),
    /// Send the CLI input line.
    Submit,
}

/// Rows left for the viewport body on a terminal `rows` tall.
pub fn body_height(rows: u16) -> usize {
    rows.saturating_sub(HEADER_ROWS + 2) as usize
}

pub trait Viewport: Sync {
    /// The line between the node summary and the body.
    fn column_header(&self, state: &SessionState, width: usize) -> Line<'static>;

    fn render(
        &self,
        store: &Store,
        state: &SessionState,
        width: usize,
        height: usize,
    ) -> Vec<Line<'static>>;

    fn handle_key(
        &self,
        key: KeyEvent,
        state: &mut SessionState,
        store: &Store,
        height: usize,
    ) -> KeyOutcome;
}

fn title_bar(text: String, width: usize) -> Line<'static> {
    Line::styled(format!("{text:<width$}"), BAR_BOLD)
}

pub struct HelpView;

impl Viewport for HelpView {
    fn column_header(&self, _state: &SessionState, width: usize) -> Line<'static> {
        title_bar(" HELP  (UP/DOWN/PGUP/PGDN to scroll, ESC to leave)".into(), width)
    }

    fn render(&self, _: &Store, state: &SessionState, _: usize, height: usize) -> Vec<Line<'static>> {
        help::render_help(state.help_scroll, height)
    }

    fn handle_key(
        &self,
        key: KeyEvent,
        state: &mut SessionState,
        _store: &Store,
        height: usize,
    ) -> KeyOutcome {
        let total = help::help_line_count();
        let delta: isize = match key.code {
            KeyCode::Up => -1,
            KeyCode::Down => 1,
            KeyCode::PageUp => -(height as isize),
            KeyCode::PageDown => height as isize,
            KeyCode::Home => -(total as isize),
            KeyCode::End => total as isize,
            _ => return KeyOutcome::Ignored,
        };
        let next = (state.help_scroll as isize + delta).max(0) as usize;
        state.help_scroll = clamp_offset(next, total, height);
        KeyOutcome::Handled
    }
}

/// STATUS, TRAFFIC, HTTP and ERRORS: the generic table over a column set.
pub struct TableView {
    pub mode: Mode,
}

impl TableView {
    fn select(
        state: &mut SessionState,
        store: &Store,
        height: usize,
        f: impl FnOnce(&mut ViewState, &Snapshot),
    ) {
        let Some(snap) = store.current() else { return };
        f(&mut state.table, snap.as_ref());
        let lines = table_lines(snap);
        if let Some(line) = line_of_service(&lines, state.table.selected_index) {
            // show the proxy separator above the first service too
            let line = if state.table.selected_index == 0 { 0 } else { line };
            state.table.reveal(line, lines.len(), height);
        }
    }
}

impl Viewport for TableView {
    fn column_header(&self, _state: &SessionState, width: usize) -> Line<'static> {
        table::header_line(columns_for(self.mode), width)
    }

    fn render(
        &self,
        store: &Store,
        state: &SessionState,
        width: usize,
        height: usize,
    ) -> Vec<Line<'static>> {
        table::render_table(columns_for(self.mode), store, &state.table, width, height)
    }

    fn handle_key(
        &self,
        key: KeyEvent,
        state: &mut SessionState,
        store: &Store,
        height: usize,
    ) -> KeyOutcome {
        let page = height.max(1) as isize;
        match key.code {
            KeyCode::Up => Self::select(state, store, height, |v, s| v.move_selection(s, -1)),
            KeyCode::Down => Self::select(state, store, height, |v, s| v.move_selection(s, 1)),
            KeyCode::PageUp => Self::select(state, store, height, |v, s| v.move_selection(s, -page)),
            KeyCode::PageDown => Self::select(state, store, height, |v, s| v.move_selection(s, page)),
            KeyCode::Home => Self::select(state, store, height, |v, s| v.select_index(s, 0)),
            KeyCode::End => Self::select(state, store, height, |v, s| {
                v.select_index(s, s.service_count().saturating_sub(1))
            }),
            KeyCode::Enter => copy_selection(state, self.mode),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }
}

/// Put `proxy/service` of the selected row into the CLI input and open it.
fn copy_selection(state: &mut SessionState, mode: Mode) {
    let Some(id) = state.table.selected.clone() else {
        state.notice = Some(format!("{mode} mode"));
        return;
    };
    if !state.modes.allows(Mode::Cli) {
        state.notice = Some("CLI is disabled in read-only mode".into());
        return;
    }
    state.shell.input.insert_str(&id.to_string());
    state.modes.jump(Mode::Cli);
}

pub struct CliView;

impl Viewport for CliView {
    fn column_header(&self, state: &SessionState, width: usize) -> Line<'static> {
        let blocks = state.shell.scrollback.block_count();
        title_bar(format!(" CLI  ({blocks} commands in scrollback)"), width)
    }

    fn render(&self, _: &Store, state: &SessionState, width: usize, height: usize) -> Vec<Line<'static>> {
        cli::render_cli(&state.shell, width, height)
    }

    fn handle_key(
        &self,
        key: KeyEvent,
        state: &mut SessionState,
        _store: &Store,
        height: usize,
    ) -> KeyOutcome {
        let cols = state.width;
        let shell = &mut state.shell;
        let rows = cli::scrollback_rows(height);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Enter => return KeyOutcome::Submit,
            KeyCode::Left if shift => shell.scroll_horizontal(-8, cols),
            KeyCode::Right if shift => shell.scroll_horizontal(8, cols),
            KeyCode::Left => shell.input.left(),
            KeyCode::Right => shell.input.right(),
            KeyCode::Home => shell.input.home(),
            KeyCode::End => shell.input.end(),
            KeyCode::Backspace => shell.input.delete_backward(),
            KeyCode::Delete => shell.input.delete_forward(),
            KeyCode::Up => shell.history_older(),
            KeyCode::Down => shell.history_newer(),
            KeyCode::PageUp => shell.scroll_page(rows as isize, rows),
            KeyCode::PageDown => shell.scroll_page(-(rows as isize), rows),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                shell.input.insert(c)
            }
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }
}

static HELP: HelpView = HelpView;
static STATUS: TableView = TableView { mode: Mode::Status };
static TRAFFIC: TableView = TableView { mode: Mode::Traffic };
static HTTP: TableView = TableView { mode: Mode::Http };
static ERRORS: TableView = TableView { mode: Mode::Errors };
static CLI: CliView = CliView;

pub fn viewport(mode: Mode) -> &'static dyn Viewport {
    match mode {
        Mode::Help => &HELP,
        Mode::Status => &STATUS,
        Mode::Traffic => &TRAFFIC,
        Mode::Http => &HTTP,
        Mode::Errors => &ERRORS,
        Mode::Cli => &CLI,
    }
}

fn hotkey_for(code: KeyCode) -> Option<Hotkey> {
    match code {
        KeyCode::F(4) => Some(Hotkey::RestoreWeight),
        KeyCode::F(5) => Some(Hotkey::WeightDown10),
        KeyCode::F(6) => Some(Hotkey::WeightDown1),
        KeyCode::F(7) => Some(Hotkey::WeightUp1),
        KeyCode::F(8) => Some(Hotkey::WeightUp10),
        KeyCode::F(9) => Some(Hotkey::Enable),
        KeyCode::F(10) => Some(Hotkey::Disable),
        _ => None,
    }
}

fn jump(state: &mut SessionState, mode: Mode) {
    if !state.modes.jump(mode) {
        state.notice = Some("CLI is disabled in read-only mode".into());
    }
}

/// Route one key: global bindings first, then the active viewport.
///
/// Pure state transition; I/O implied by the outcome is left to the caller.
pub fn handle_key(key: KeyEvent, state: &mut SessionState, store: &Store, height: usize) -> KeyOutcome {
    state.notice = None;
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }
    if let Some(hk) = hotkey_for(key.code) {
        return KeyOutcome::Hotkey(hk);
    }
    match key.code {
        KeyCode::Tab => state.modes.cycle_forward(),
        KeyCode::BackTab => state.modes.cycle_backward(),
        KeyCode::Esc => state.modes.jump_previous(),
        _ if state.modes.current() == Mode::Cli => {
            return viewport(Mode::Cli).handle_key(key, state, store, height)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => return KeyOutcome::Quit,
        KeyCode::Char(' ') => return KeyOutcome::Refresh,
        KeyCode::Char('`') => state.modes.jump_previous(),
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => jump(state, Mode::Help),
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(mode) = c.to_digit(10).and_then(Mode::from_number) {
                jump(state, mode);
            }
        }
        _ => {
            let mode = state.modes.current();
            return viewport(mode).handle_key(key, state, store, height);
        }
    }
    KeyOutcome::Handled
}

/// Paint the whole screen.
pub fn draw(f: &mut Frame<'_>, store: &Store, state: &SessionState) {
    let area = f.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "terminal too small ({}x{}), need at least {MIN_WIDTH}x{MIN_HEIGHT}",
            area.width, area.height
        );
        f.render_widget(Paragraph::new(Line::styled(msg, BOLD)), area);
        return;
    }

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(HEADER_ROWS - 1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);
    let width = area.width as usize;
    let view = viewport(state.modes.current());

    f.render_widget(
        Paragraph::new(header::title_line(&state.liveness, width)),
        rows[0],
    );
    f.render_widget(Paragraph::new(header::info_lines(store)), rows[1]);
    f.render_widget(Paragraph::new(view.column_header(state, width)), rows[2]);
    f.render_widget(
        Paragraph::new(view.render(store, state, width, rows[3].height as usize)),
        rows[3],
    );
    f.render_widget(
        Paragraph::new(footer::footer_line(&state.modes, state.notice.as_deref(), width)),
        rows[4],
    );
}
