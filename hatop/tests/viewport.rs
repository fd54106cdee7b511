//! Key routing, scrolling and selection across refreshes and resizes.
mod common;

use common::{screen, terminal, Scripted};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hatop::app::{apply_key, refresh, SessionState};
use hatop::mode::{clamp_offset, Mode};
use hatop::store::Store;
use hatop::types::ServiceId;
use hatop::ui::{handle_key, table::table_lines, KeyOutcome};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn loaded(stat: &str) -> (Scripted, Store, SessionState) {
    let mut peer = Scripted::new(stat);
    let mut store = Store::new();
    let mut state = SessionState::new(Mode::Status, false);
    refresh(&mut peer, &mut store, &mut state).await;
    (peer, store, state)
}

fn big_stat(n: usize) -> String {
    let mut s = String::from("pxname,svname,status,weight\n");
    for i in 0..n {
        s.push_str(&format!("app,srv{i},UP,10\n"));
    }
    s
}

#[tokio::test]
async fn selection_survives_refresh_by_identity() {
    let (mut peer, mut store, mut state) = loaded(common::STAT).await;
    let h = state.body_rows;
    handle_key(key(KeyCode::Down), &mut state, &store, h);
    handle_key(key(KeyCode::Down), &mut state, &store, h);
    assert_eq!(state.table.selected, Some(ServiceId::new("app", "web3")));

    // web1 disappears: web3 moves up one row but stays selected
    peer.stat = common::STAT.replace("app,web1,UP,100,3,100,1000,2000\n", "");
    refresh(&mut peer, &mut store, &mut state).await;
    assert_eq!(state.table.selected, Some(ServiceId::new("app", "web3")));
    assert_eq!(state.table.selected_index, 1);
}

#[tokio::test]
async fn vanished_selection_falls_back_to_clamped_index() {
    let (mut peer, mut store, mut state) = loaded(common::STAT).await;
    let h = state.body_rows;
    handle_key(key(KeyCode::End), &mut state, &store, h);
    assert_eq!(state.table.selected, Some(ServiceId::new("static", "BACKEND")));

    peer.stat = "pxname,svname,status\napp,web1,UP\napp,web2,UP\n".into();
    refresh(&mut peer, &mut store, &mut state).await;
    assert_eq!(state.table.selected_index, 1);
    assert_eq!(state.table.selected, Some(ServiceId::new("app", "web2")));
}

#[tokio::test]
async fn scroll_stays_in_bounds_across_resizes() {
    let (mut peer, mut store, mut state) = loaded(&big_stat(60)).await;
    state.resize(100, 30, &store);
    let h = state.body_rows;
    for _ in 0..10 {
        handle_key(key(KeyCode::PageDown), &mut state, &store, h);
    }
    let total = table_lines(store.current().unwrap()).len();
    assert_eq!(state.table.scroll, clamp_offset(state.table.scroll, total, h));

    state.resize(100, 80, &store);
    assert!(state.table.scroll <= total.saturating_sub(state.body_rows));

    peer.stat = big_stat(5);
    refresh(&mut peer, &mut store, &mut state).await;
    assert_eq!(state.table.scroll, 0);
    assert_eq!(state.table.selected_index, 4);
}

#[tokio::test]
async fn mode_keys_and_previous_toggle() {
    let (_peer, store, mut state) = loaded(common::STAT).await;
    let h = state.body_rows;
    handle_key(key(KeyCode::Char('3')), &mut state, &store, h);
    handle_key(key(KeyCode::Char('4')), &mut state, &store, h);
    handle_key(key(KeyCode::Char('`')), &mut state, &store, h);
    assert_eq!(state.modes.current(), Mode::Http);
    handle_key(key(KeyCode::Esc), &mut state, &store, h);
    assert_eq!(state.modes.current(), Mode::Errors);
    for _ in 0..6 {
        handle_key(key(KeyCode::Tab), &mut state, &store, h);
    }
    assert_eq!(state.modes.current(), Mode::Errors);
    handle_key(key(KeyCode::Char('?')), &mut state, &store, h);
    assert_eq!(state.modes.current(), Mode::Help);
    assert_eq!(
        handle_key(key(KeyCode::Char('q')), &mut state, &store, h),
        KeyOutcome::Quit
    );
}

#[tokio::test]
async fn typing_in_cli_does_not_switch_modes() {
    let (_peer, store, mut state) = loaded(common::STAT).await;
    let h = state.body_rows;
    handle_key(key(KeyCode::Char('5')), &mut state, &store, h);
    assert_eq!(state.modes.current(), Mode::Cli);
    for c in "q1h ".chars() {
        handle_key(key(KeyCode::Char(c)), &mut state, &store, h);
    }
    assert_eq!(state.modes.current(), Mode::Cli);
    assert_eq!(state.shell.input.text(), "q1h ");
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(handle_key(ctrl_c, &mut state, &store, h), KeyOutcome::Quit);
}

#[tokio::test]
async fn enter_copies_selection_into_cli() {
    let (mut peer, mut store, mut state) = loaded(common::STAT).await;
    apply_key(key(KeyCode::Down), &mut peer, &mut store, &mut state).await;
    apply_key(key(KeyCode::Enter), &mut peer, &mut store, &mut state).await;
    assert_eq!(state.modes.current(), Mode::Cli);
    assert_eq!(state.shell.input.text(), "app/web2");
}

#[tokio::test]
async fn enter_without_selection_shows_mode_marker() {
    let store = Store::new();
    let mut state = SessionState::new(Mode::Traffic, false);
    let h = state.body_rows;
    handle_key(key(KeyCode::Enter), &mut state, &store, h);
    assert_eq!(state.modes.current(), Mode::Traffic);
    assert_eq!(state.notice.as_deref(), Some("TRAFFIC mode"));

    let mut term = terminal(100, 30);
    term.draw(|f| hatop::ui::draw(f, &store, &state)).unwrap();
    assert!(screen(&term)[29].contains("TRAFFIC mode"));
}

#[tokio::test]
async fn every_mode_draws() {
    let (_peer, store, mut state) = loaded(common::STAT).await;
    let mut term = terminal(120, 40);
    for _ in 0..6 {
        term.draw(|f| hatop::ui::draw(f, &store, &state)).unwrap();
        let rows = screen(&term);
        assert!(rows[0].contains("hatop version"));
        state.modes.cycle_forward();
    }
}

#[tokio::test]
async fn small_terminal_shows_notice() {
    let (_peer, store, state) = loaded(common::STAT).await;
    let mut term = terminal(60, 10);
    term.draw(|f| hatop::ui::draw(f, &store, &state)).unwrap();
    assert!(screen(&term)[0].contains("terminal too small"));
}
