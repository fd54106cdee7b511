//! Generic table renderer shared by the STATUS/TRAFFIC/HTTP/ERRORS modes.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::mode::{clamp_offset, ViewState};
use crate::store::{Snapshot, Store};
use crate::ui::columns::Column;
use crate::ui::theme::{status_style, BAR_BOLD, BOLD, SELECTED};
use crate::ui::util::pad;

/// Tables never grow wider than this; extra terminal width is left blank.
pub const MAX_WIDTH: usize = 200;
const SEP: &str = " ";

/// Pick which columns fit in `width` and how wide each one is.
///
/// Lowest-priority columns are dropped until the minimum widths fit, then
/// the remaining space is handed out one char at a time from left to right,
/// respecting each column's max width.
pub fn fit_columns(cols: &[Column], width: usize) -> Vec<(usize, usize)> {
    let width = width.min(MAX_WIDTH);
    let mut keep: Vec<usize> = (0..cols.len()).collect();
    let needed = |keep: &[usize]| -> usize {
        keep.iter().map(|&i| cols[i].min).sum::<usize>() + keep.len().saturating_sub(1)
    };
    while keep.len() > 1 && needed(&keep) > width {
        // ties: drop the rightmost
        let victim = keep
            .iter()
            .enumerate()
            .min_by(|a, b| {
                cols[*a.1]
                    .priority
                    .cmp(&cols[*b.1].priority)
                    .then(b.0.cmp(&a.0))
            })
            .map(|(pos, _)| pos);
        if let Some(pos) = victim {
            keep.remove(pos);
        }
    }

    let mut widths: Vec<usize> = keep.iter().map(|&i| cols[i].min).collect();
    let mut spare = width.saturating_sub(needed(&keep));
    while spare > 0 {
        let mut grew = false;
        for (slot, &i) in widths.iter_mut().zip(keep.iter()) {
            if spare == 0 {
                break;
            }
            if cols[i].max == 0 || *slot < cols[i].max {
                *slot += 1;
                spare -= 1;
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }
    keep.into_iter().zip(widths).collect()
}

/// One screen line of a table: a proxy separator or a service row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLine {
    Proxy(usize),
    /// Index into `Snapshot::services()`.
    Service(usize),
}

pub fn table_lines(snap: &Snapshot) -> Vec<TableLine> {
    let mut out = Vec::with_capacity(snap.proxies.len() + snap.service_count());
    let mut flat = 0;
    for (pi, proxy) in snap.proxies.iter().enumerate() {
        out.push(TableLine::Proxy(pi));
        for _ in &proxy.services {
            out.push(TableLine::Service(flat));
            flat += 1;
        }
    }
    out
}

/// Screen line holding the `flat`-th service.
pub fn line_of_service(lines: &[TableLine], flat: usize) -> Option<usize> {
    lines.iter().position(|l| *l == TableLine::Service(flat))
}

pub fn header_line(cols: &[Column], width: usize) -> Line<'static> {
    let text = fit_columns(cols, width)
        .into_iter()
        .map(|(i, w)| pad(cols[i].label, w, cols[i].align))
        .collect::<Vec<_>>()
        .join(SEP);
    Line::styled(format!("{text:<width$}"), BAR_BOLD)
}

/// Render the visible window of the table body.
pub fn render_table(
    cols: &[Column],
    store: &Store,
    view: &ViewState,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let Some(snap) = store.current() else {
        return vec![Line::from(" waiting for data...")];
    };
    if snap.service_count() == 0 {
        return vec![Line::from(" no proxies reported")];
    }
    let fitted = fit_columns(cols, width);
    let lines = table_lines(snap);
    let offset = clamp_offset(view.scroll, lines.len(), height);
    let selected = view
        .selected
        .as_ref()
        .and_then(|id| snap.position(id));

    let services: Vec<_> = snap.services().collect();
    lines
        .iter()
        .skip(offset)
        .take(height)
        .map(|line| match *line {
            TableLine::Proxy(pi) => Line::styled(format!(">>> {}", snap.proxies[pi].name), BOLD),
            TableLine::Service(flat) => {
                let svc = services[flat];
                let changed = store.status_changed(&svc.id());
                let mut spans: Vec<Span<'static>> = Vec::with_capacity(fitted.len() * 2);
                for (n, &(ci, w)) in fitted.iter().enumerate() {
                    if n > 0 {
                        spans.push(Span::raw(SEP));
                    }
                    let col = &cols[ci];
                    let text = pad(&(col.source)(svc, store).format(w), w, col.align);
                    let style = if col.status {
                        let st = status_style(&svc.status);
                        if changed {
                            st.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                        } else {
                            st
                        }
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(text, style));
                }
                let mut row = Line::from(spans);
                if svc.is_aggregate() {
                    row = row.style(BOLD);
                }
                if selected == Some(flat) {
                    row = row.patch_style(SELECTED);
                }
                row
            }
        })
        .collect()
}
