//! Column sets for the four table modes.
//!
//! `priority` decides which columns go first on narrow terminals: the lowest
//! value is dropped first. NAME/W/STATUS are never dropped before the rest.

use crate::mode::Mode;
use crate::store::Store;
use crate::types::{Counter, Service};
use crate::ui::util::{human_bytes, human_metric, human_time, Align};

/// Raw cell content; formatting depends on the kind and the column width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Count(u64),
    Limit(Option<u64>),
    Bytes(u64),
    Seconds(Option<u64>),
    /// Bytes per second derived from two snapshots.
    ByteRate(f64),
}

impl Value {
    pub fn format(&self, width: usize) -> String {
        let fit = |s: String, n: u64| {
            if s.chars().count() > width {
                human_metric(n)
            } else {
                s
            }
        };
        match self {
            Value::Text(s) => s.clone(),
            Value::Count(n) => fit(n.to_string(), *n),
            Value::Limit(Some(n)) => fit(n.to_string(), *n),
            Value::Limit(None) | Value::Seconds(None) => String::new(),
            Value::Bytes(n) => human_bytes(*n),
            Value::Seconds(Some(s)) => human_time(*s),
            Value::ByteRate(r) => human_bytes(r.max(0.0).round() as u64),
        }
    }
}

pub type Source = fn(&Service, &Store) -> Value;

#[derive(Clone, Copy)]
pub struct Column {
    pub label: &'static str,
    pub min: usize,
    /// 0 means unbounded.
    pub max: usize,
    pub align: Align,
    pub priority: u8,
    pub source: Source,
    /// Colour the cell by service status.
    pub status: bool,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("priority", &self.priority)
            .finish()
    }
}

const fn col(
    label: &'static str,
    min: usize,
    max: usize,
    align: Align,
    priority: u8,
    source: Source,
) -> Column {
    Column {
        label,
        min,
        max,
        align,
        priority,
        source,
        status: false,
    }
}

const NAME: Column = col("NAME", 10, 50, Align::Left, 255, |s, _| {
    Value::Text(s.name.clone())
});
const WEIGHT: Column = col("W", 4, 6, Align::Right, 250, |s, _| Value::Limit(s.weight));
const STATUS: Column = Column {
    status: true,
    ..col("STATUS", 6, 10, Align::Left, 245, |s, _| {
        Value::Text(s.status.to_string())
    })
};
const CHECK: Column = col("CHECK", 7, 20, Align::Left, 200, |s, _| {
    Value::Text(s.check_status.clone())
});

const R: Align = Align::Right;

pub static STATUS_COLUMNS: [Column; 12] = [
    NAME,
    WEIGHT,
    STATUS,
    CHECK,
    col("ACT", 3, 0, R, 90, |s, _| Value::Count(s.active)),
    col("BCK", 3, 0, R, 80, |s, _| Value::Count(s.backup)),
    col("QCUR", 5, 0, R, 150, |s, _| Value::Count(s.queue_cur)),
    col("QMAX", 5, 0, R, 100, |s, _| Value::Count(s.queue_max)),
    col("SCUR", 6, 0, R, 180, |s, _| Value::Count(s.sessions_cur)),
    col("SMAX", 6, 0, R, 120, |s, _| Value::Count(s.sessions_max)),
    col("SLIM", 6, 0, R, 70, |s, _| Value::Limit(s.sessions_limit)),
    col("STOT", 6, 0, R, 110, |s, _| Value::Count(s.sessions_total)),
];

pub static TRAFFIC_COLUMNS: [Column; 11] = [
    NAME,
    WEIGHT,
    STATUS,
    col("LBTOT", 8, 0, R, 100, |s, _| Value::Count(s.lb_total)),
    col("RATE", 6, 0, R, 180, |s, _| Value::Count(s.rate)),
    col("RLIM", 6, 0, R, 80, |s, _| Value::Limit(s.rate_limit)),
    col("RMAX", 6, 0, R, 120, |s, _| Value::Count(s.rate_max)),
    col("BIN", 12, 0, R, 160, |s, _| Value::Bytes(s.bytes_in)),
    col("BOUT", 12, 0, R, 160, |s, _| Value::Bytes(s.bytes_out)),
    col("BIN/s", 8, 0, R, 20, |s, st| {
        Value::ByteRate(st.rate_of(Counter::BytesIn, &s.id()))
    }),
    col("BOUT/s", 8, 0, R, 10, |s, st| {
        Value::ByteRate(st.rate_of(Counter::BytesOut, &s.id()))
    }),
];

pub static HTTP_COLUMNS: [Column; 12] = [
    NAME,
    WEIGHT,
    STATUS,
    col("RATE", 5, 0, R, 180, |s, _| Value::Count(s.req_rate)),
    col("RMAX", 5, 0, R, 120, |s, _| Value::Count(s.req_rate_max)),
    col("RTOT", 7, 0, R, 150, |s, _| Value::Count(s.req_total)),
    col("1xx", 5, 0, R, 60, |s, _| Value::Count(s.hrsp_1xx)),
    col("2xx", 5, 0, R, 110, |s, _| Value::Count(s.hrsp_2xx)),
    col("3xx", 5, 0, R, 90, |s, _| Value::Count(s.hrsp_3xx)),
    col("4xx", 5, 0, R, 100, |s, _| Value::Count(s.hrsp_4xx)),
    col("5xx", 5, 0, R, 105, |s, _| Value::Count(s.hrsp_5xx)),
    col("?xx", 5, 0, R, 50, |s, _| Value::Count(s.hrsp_other)),
];

pub static ERRORS_COLUMNS: [Column; 13] = [
    NAME,
    WEIGHT,
    STATUS,
    CHECK,
    col("CF", 3, 0, R, 150, |s, _| Value::Count(s.check_fail)),
    col("CD", 3, 0, R, 140, |s, _| Value::Count(s.check_down)),
    col("CL", 3, 0, R, 130, |s, _| Value::Seconds(s.last_change)),
    col("ECONN", 5, 0, R, 120, |s, _| Value::Count(s.err_conn)),
    col("EREQ", 5, 0, R, 110, |s, _| Value::Count(s.err_req)),
    col("ERSP", 5, 0, R, 100, |s, _| Value::Count(s.err_resp)),
    col("DREQ", 5, 0, R, 80, |s, _| Value::Count(s.denied_req)),
    col("DRSP", 5, 0, R, 70, |s, _| Value::Count(s.denied_resp)),
    col("DOWN", 5, 0, R, 90, |s, _| Value::Seconds(s.downtime)),
];

/// Column set of a table mode; empty for HELP and CLI.
pub fn columns_for(mode: Mode) -> &'static [Column] {
    match mode {
        Mode::Status => &STATUS_COLUMNS,
        Mode::Traffic => &TRAFFIC_COLUMNS,
        Mode::Http => &HTTP_COLUMNS,
        Mode::Errors => &ERRORS_COLUMNS,
        Mode::Help | Mode::Cli => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_switch_to_prefix_only_when_too_wide() {
        assert_eq!(Value::Count(12345).format(6), "12345");
        assert_eq!(Value::Count(1_234_567).format(6), "1.2M");
        assert_eq!(Value::Bytes(4096).format(12), "4.0K");
        assert_eq!(Value::Seconds(Some(120)).format(3), "2m");
        assert_eq!(Value::Limit(None).format(6), "");
    }

    #[test]
    fn every_table_mode_starts_with_identity_columns() {
        for mode in [Mode::Status, Mode::Traffic, Mode::Http, Mode::Errors] {
            let cols = columns_for(mode);
            assert_eq!(cols[0].label, "NAME");
            assert_eq!(cols[1].label, "W");
            assert_eq!(cols[2].label, "STATUS");
        }
        assert!(columns_for(Mode::Cli).is_empty());
    }
}
