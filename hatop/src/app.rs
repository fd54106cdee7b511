//! App state and main loop: input handling, polling the admin socket, and drawing.

use std::{io, time::Duration};

use anyhow::Context;
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::hotkey;
use crate::mode::{clamp_offset, Mode, ModeState, ViewState};
use crate::session::{request_info, request_stats, Session, SessionError, Transport};
use crate::shell::Shell;
use crate::store::Store;
use crate::ui::{self, body_height, cli::scrollback_rows, help::help_line_count, KeyOutcome};

/// Freshness of what is on screen, shown in the title bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Liveness {
    #[default]
    Connecting,
    Live,
    /// Last poll returned nothing usable; older data is still shown.
    Stale(String),
    Unreachable(String),
}

/// Everything the viewports read and the key handlers mutate.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub modes: ModeState,
    /// Shared by all table modes so the selection follows mode switches.
    pub table: ViewState,
    pub help_scroll: usize,
    pub shell: Shell,
    pub liveness: Liveness,
    pub notice: Option<String>,
    pub read_only: bool,
    pub width: usize,
    pub body_rows: usize,
}

impl SessionState {
    pub fn new(mode: Mode, read_only: bool) -> Self {
        Self {
            modes: ModeState::new(mode, read_only),
            table: ViewState::default(),
            help_scroll: 0,
            shell: Shell::new(),
            liveness: Liveness::Connecting,
            notice: None,
            read_only,
            width: ui::MIN_WIDTH as usize,
            body_rows: body_height(ui::MIN_HEIGHT),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16, store: &Store) {
        self.width = cols as usize;
        self.body_rows = body_height(rows);
        self.clamp(store);
    }

    /// Pull every scroll offset back inside its content.
    pub fn clamp(&mut self, store: &Store) {
        let rows = self.body_rows;
        let lines = store
            .current()
            .map(|s| ui::table::table_lines(s).len())
            .unwrap_or(0);
        self.table.scroll = clamp_offset(self.table.scroll, lines, rows);
        self.help_scroll = clamp_offset(self.help_scroll, help_line_count(), rows);
        let sb = scrollback_rows(rows);
        self.shell.scroll_page(0, sb);
        self.shell.scroll_horizontal(0, self.width);
    }
}

fn mark_failed(state: &mut SessionState, err: &SessionError) {
    state.liveness = if err.is_unreachable() {
        Liveness::Unreachable(err.to_string())
    } else {
        Liveness::Stale(err.to_string())
    };
}

/// One statistics cycle: `show info` + `show stat` into the store.
///
/// Failures and empty feeds keep the previous snapshots and only change the
/// liveness indicator.
pub async fn refresh<T: Transport>(transport: &mut T, store: &mut Store, state: &mut SessionState) {
    let node = match request_info(transport).await {
        Ok(node) => node,
        Err(e) => {
            mark_failed(state, &e);
            return;
        }
    };
    let proxies = match request_stats(transport).await {
        Ok(p) => p,
        Err(e) => {
            mark_failed(state, &e);
            return;
        }
    };
    if proxies.is_empty() {
        warn!("show stat returned no usable rows; keeping previous data");
        state.liveness = Liveness::Stale("empty statistics response".into());
        return;
    }
    store.update(node, proxies);
    if let Some(snap) = store.current() {
        debug!(
            proxies = snap.proxies.len(),
            services = snap.service_count(),
            "snapshot updated"
        );
        state.table.reselect(snap);
    }
    state.clamp(store);
    state.liveness = Liveness::Live;
}

/// Route a key and carry out the socket work it implies.
///
/// Returns true when the user asked to quit.
pub async fn apply_key<T: Transport>(
    key: KeyEvent,
    transport: &mut T,
    store: &mut Store,
    state: &mut SessionState,
) -> bool {
    let height = state.body_rows;
    match ui::handle_key(key, state, store, height) {
        KeyOutcome::Quit => return true,
        KeyOutcome::Refresh => refresh(transport, store, state).await,
        KeyOutcome::Submit => {
            state.shell.submit(transport).await;
        }
        KeyOutcome::Hotkey(hk) => {
            let selected = state
                .table
                .selected
                .as_ref()
                .and_then(|id| store.current().and_then(|s| s.find(id)));
            let res = hotkey::run(hk, selected, state.read_only, transport, &mut state.shell).await;
            match res {
                Ok(cmd) => {
                    state.notice = Some(cmd);
                    refresh(transport, store, state).await;
                }
                Err(e) => state.notice = Some(e.to_string()),
            }
        }
        KeyOutcome::Handled | KeyOutcome::Ignored => {}
    }
    false
}

/// Leave raw mode and the alternate screen, attempting every step.
fn restore_terminal() -> anyhow::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, Show);
    raw.context("cannot leave raw mode")?;
    screen.context("cannot leave the alternate screen")?;
    Ok(())
}

/// Teardown after the loop: the terminal is restored and the session closed
/// even when the loop or the restore failed. The loop's error wins.
async fn finish(
    session: &mut Session,
    res: anyhow::Result<()>,
    restore: impl FnOnce() -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let restored = restore();
    if let Err(e) = &restored {
        warn!(error = %e, "terminal restore failed");
    }
    session.close().await;
    info!("session closed");
    res.and(restored)
}

pub struct App {
    session: Session,
    store: Store,
    state: SessionState,
    interval: Duration,
}

impl App {
    pub fn new(session: Session, interval: Duration, mode: Mode, read_only: bool) -> Self {
        Self {
            session,
            store: Store::new(),
            state: SessionState::new(mode, read_only),
            interval,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode().context("cannot switch the terminal to raw mode")?;
        let res = self.run_in_terminal().await;
        finish(&mut self.session, res, restore_terminal).await
    }

    async fn run_in_terminal(&mut self) -> anyhow::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("cannot enter the alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        self.event_loop(&mut terminal).await
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        let size = terminal.size()?;
        self.state.resize(size.width, size.height, &self.store);

        let mut events = EventStream::new();
        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            terminal.draw(|f| ui::draw(f, &self.store, &self.state))?;

            tokio::select! {
                _ = tick.tick() => {
                    refresh(&mut self.session, &mut self.store, &mut self.state).await;
                }
                ev = events.next() => match ev {
                    Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => {
                        let quit = apply_key(k, &mut self.session, &mut self.store, &mut self.state).await;
                        if quit {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(w, h))) => self.state.resize(w, h, &self.store),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    async fn connected_session(dir: &tempfile::TempDir) -> Session {
        let path = dir.path().join("admin.sock");
        let listener = UnixListener::bind(&path).unwrap();
        tokio::spawn(hatop_sample_socket::serve(
            listener,
            hatop_sample_socket::AppState::default(),
        ));
        let mut s = Session::new(&path, Duration::from_millis(500));
        s.connect().await.unwrap();
        s
    }

    #[tokio::test]
    async fn failed_restore_still_closes_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = connected_session(&dir).await;
        assert!(s.is_connected());
        let res = finish(&mut s, Ok(()), || Err(anyhow::anyhow!("tty gone"))).await;
        assert_eq!(res.unwrap_err().to_string(), "tty gone");
        assert!(!s.is_connected());
    }

    #[tokio::test]
    async fn loop_error_wins_and_restore_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = connected_session(&dir).await;
        let mut restored = false;
        let res = finish(&mut s, Err(anyhow::anyhow!("event stream failed")), || {
            restored = true;
            Err(anyhow::anyhow!("tty gone"))
        })
        .await;
        assert_eq!(res.unwrap_err().to_string(), "event stream failed");
        assert!(restored);
        assert!(!s.is_connected());
    }
}
