//! Title bar and node summary above the table.

use chrono::Local;
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::app::Liveness;
use crate::store::Store;
use crate::ui::theme::{BAR, BAR_BOLD, BOLD, LIVE, STALE, UNREACHABLE};
use crate::ui::util::status_bar;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rows used by the title bar and the node summary (column header excluded).
pub const HEADER_ROWS: u16 = 11;

fn or_blank<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

fn liveness_span(l: &Liveness) -> Span<'static> {
    let (text, color) = match l {
        Liveness::Connecting => ("CONNECTING".to_string(), STALE),
        Liveness::Live => ("LIVE".to_string(), LIVE),
        Liveness::Stale(why) => (format!("STALE: {why}"), STALE),
        Liveness::Unreachable(why) => (format!("UNREACHABLE: {why}"), UNREACHABLE),
    };
    Span::styled(format!(" {text} "), BAR_BOLD.fg(color))
}

pub fn title_line(liveness: &Liveness, width: usize) -> Line<'static> {
    let left = format!(" hatop version {VERSION}");
    let clock = format!("{} ", Local::now().format("%a %b %e %H:%M:%S %Y"));
    let live = liveness_span(liveness);
    let used = left.len() + clock.len() + live.content.chars().count();
    let gap = " ".repeat(width.saturating_sub(used).max(1));
    Line::from(vec![
        Span::styled(left, BAR_BOLD),
        Span::styled(gap, BAR),
        live,
        Span::styled(clock, BAR_BOLD),
    ])
}

/// Node summary lines. Missing `show info` fields print as blanks.
pub fn info_lines(store: &Store) -> Vec<Line<'static>> {
    let snap = store.current();
    let node = snap.map(|s| s.node.clone()).unwrap_or_default();
    let (proxies, services) = snap
        .map(|s| (s.proxies.len(), s.service_count()))
        .unwrap_or((0, 0));

    let software = format!(
        "  {} Version: {}  (released: {})",
        or_blank(&node.software_name),
        or_blank(&node.software_version),
        or_blank(&node.release_date),
    );
    let pid = format!(
        "PID: {} (proc {})",
        or_blank(&node.pid),
        or_blank(&node.process_num)
    );
    let top = format!("{software:<56}{pid}");

    let node_line = format!(
        "         Node: {} (uptime {})",
        node.node.clone().unwrap_or_else(|| "unknown".into()),
        or_blank(&node.uptime)
    );
    let pipes = format!(
        "        Pipes: {}",
        status_bar(node.pipes_used.unwrap_or(0), node.max_pipes.unwrap_or(0), 60)
    );
    let conns = format!(
        "  Connections: {}",
        status_bar(node.cur_conn.unwrap_or(0), node.max_conn.unwrap_or(0), 60)
    );
    let counts = format!(
        "  Procs: {:>3}   Tasks: {:>5}    Queue: {:>5}    Proxies: {:>3}   Services: {:>4}",
        or_blank(&node.nbproc),
        or_blank(&node.tasks),
        or_blank(&node.run_queue),
        proxies,
        services,
    );

    vec![
        Line::default(),
        Line::styled(top, BOLD),
        Line::default(),
        Line::from(node_line),
        Line::default(),
        Line::from(pipes),
        Line::from(conns),
        Line::default(),
        Line::from(counts),
        Line::styled(String::new(), Style::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeInfo;

    fn text(l: &Line<'_>) -> String {
        l.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn blank_info_renders_without_panicking() {
        let store = Store::new();
        let lines = info_lines(&store);
        assert_eq!(lines.len() as u16, HEADER_ROWS - 1);
        assert!(text(&lines[3]).contains("Node: unknown"));
    }

    #[test]
    fn info_values_show_up() {
        let mut store = Store::new();
        store.update(
            NodeInfo {
                node: Some("lb1".into()),
                pid: Some(4242),
                ..Default::default()
            },
            Vec::new(),
        );
        let lines = info_lines(&store);
        assert!(text(&lines[1]).contains("PID: 4242"));
        assert!(text(&lines[3]).contains("Node: lb1"));
    }

    #[test]
    fn title_shows_liveness() {
        let l = title_line(&Liveness::Unreachable("no such file".into()), 100);
        assert!(text(&l).contains("UNREACHABLE: no such file"));
    }
}
