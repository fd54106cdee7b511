//! Types that mirror the balancer's `show info` / `show stat` output.

use std::fmt;

/// Stable identity of a service row across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId {
    pub proxy: String,
    pub service: String,
}

impl ServiceId {
    pub fn new(proxy: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            proxy: proxy.into(),
            service: service.into(),
        }
    }
}

// The admin socket addresses servers as `proxy/service`
impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.proxy, self.service)
    }
}

/// Operational status as reported in the `status` column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    Up,
    Down,
    NoLb,
    Maint,
    MaintVia,
    Open,
    Full,
    /// Up but failing checks, e.g. `UP 1/3`.
    GoingDown(String),
    /// Down but passing checks, e.g. `DOWN 1/2`.
    GoingUp(String),
    /// Health checks disabled (`no check`).
    NoCheck,
    /// Field absent from the feed.
    #[default]
    Unknown,
    Other(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "" => Status::Unknown,
            "UP" => Status::Up,
            "DOWN" => Status::Down,
            "NOLB" => Status::NoLb,
            "MAINT" => Status::Maint,
            "MAINT(via)" => Status::MaintVia,
            "OPEN" => Status::Open,
            "FULL" => Status::Full,
            "no check" => Status::NoCheck,
            _ => {
                if let Some(rest) = raw.strip_prefix("UP ") {
                    Status::GoingDown(rest.trim().to_string())
                } else if let Some(rest) = raw.strip_prefix("DOWN ") {
                    Status::GoingUp(rest.trim().to_string())
                } else {
                    Status::Other(raw.to_string())
                }
            }
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Status::Up | Status::Open | Status::GoingDown(_))
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Status::Down | Status::GoingUp(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => f.write_str("UP"),
            Status::Down => f.write_str("DOWN"),
            Status::NoLb => f.write_str("NOLB"),
            Status::Maint => f.write_str("MAINT"),
            Status::MaintVia => f.write_str("MAINT(via)"),
            Status::Open => f.write_str("OPEN"),
            Status::Full => f.write_str("FULL"),
            Status::GoingDown(step) => write!(f, "UP {step}"),
            Status::GoingUp(step) => write!(f, "DOWN {step}"),
            Status::NoCheck => f.write_str("-"),
            Status::Unknown => f.write_str("UNKNOWN"),
            Status::Other(s) => f.write_str(s),
        }
    }
}

/// Numeric fields a rate can be derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Sessions,
    BytesIn,
    BytesOut,
    Requests,
    LbTotal,
}

/// One row of `show stat`: a server, or a FRONTEND/BACKEND aggregate.
///
/// Counters absent from the feed are zero; limits and weight are `None` when
/// absent or empty since an empty value means "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Service {
    pub proxy: String,
    pub name: String,
    pub weight: Option<u64>,
    pub status: Status,
    pub check_status: String,
    /// Server: 1 if active. Backend: number of active servers.
    pub active: u64,
    /// Server: 1 if backup. Backend: number of backup servers.
    pub backup: u64,
    pub queue_cur: u64,
    pub queue_max: u64,
    pub queue_limit: Option<u64>,
    pub sessions_cur: u64,
    pub sessions_max: u64,
    pub sessions_limit: Option<u64>,
    pub sessions_total: u64,
    pub lb_total: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub rate: u64,
    pub rate_limit: Option<u64>,
    pub rate_max: u64,
    pub req_rate: u64,
    pub req_rate_max: u64,
    pub req_total: u64,
    pub hrsp_1xx: u64,
    pub hrsp_2xx: u64,
    pub hrsp_3xx: u64,
    pub hrsp_4xx: u64,
    pub hrsp_5xx: u64,
    pub hrsp_other: u64,
    pub check_fail: u64,
    pub check_down: u64,
    /// Seconds since the last status change.
    pub last_change: Option<u64>,
    /// Cumulative downtime in seconds.
    pub downtime: Option<u64>,
    pub err_conn: u64,
    pub err_req: u64,
    pub err_resp: u64,
    pub denied_req: u64,
    pub denied_resp: u64,
}

impl Service {
    pub fn id(&self) -> ServiceId {
        ServiceId::new(self.proxy.clone(), self.name.clone())
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.name.as_str(), "FRONTEND" | "BACKEND")
    }

    pub fn counter(&self, c: Counter) -> u64 {
        match c {
            Counter::Sessions => self.sessions_total,
            Counter::BytesIn => self.bytes_in,
            Counter::BytesOut => self.bytes_out,
            Counter::Requests => self.req_total,
            Counter::LbTotal => self.lb_total,
        }
    }
}

/// A proxy and its services in feed order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Proxy {
    pub name: String,
    pub services: Vec<Service>,
}

impl Proxy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
        }
    }

    /// The BACKEND row if present, otherwise the FRONTEND row.
    pub fn aggregate(&self) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.name == "BACKEND")
            .or_else(|| self.services.iter().find(|s| s.name == "FRONTEND"))
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// Output of `show info`. Every field is optional: a missing or malformed
/// line leaves a blank in the header instead of failing the refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeInfo {
    pub software_name: Option<String>,
    pub software_version: Option<String>,
    pub release_date: Option<String>,
    pub node: Option<String>,
    pub description: Option<String>,
    pub uptime: Option<String>,
    pub pid: Option<u64>,
    pub process_num: Option<u64>,
    pub nbproc: Option<u64>,
    pub max_conn: Option<u64>,
    pub cur_conn: Option<u64>,
    pub max_pipes: Option<u64>,
    pub pipes_used: Option<u64>,
    pub tasks: Option<u64>,
    pub run_queue: Option<u64>,
}
