//! Decoders for `show stat` (CSV with a header line) and `show info` (key: value lines).
//!
//! Both are total: bad input degrades to fewer rows or blank fields, never an error.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{NodeInfo, Proxy, Service, Status};

const SEP: char = ',';
const COMMENT: char = '#';

/// Maps header field names to their column index for one feed.
struct Header {
    index: HashMap<String, usize>,
    // number of named fields; rows shorter than this are malformed
    named: usize,
    // raw field count including a trailing empty field
    raw: usize,
}

impl Header {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim().trim_start_matches(COMMENT).trim_start();
        let fields: Vec<&str> = line.split(SEP).map(str::trim).collect();
        let named = fields
            .iter()
            .rposition(|f| !f.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0);
        let index: HashMap<String, usize> = fields[..named]
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_empty())
            .map(|(i, f)| (f.to_string(), i))
            .collect();
        if !index.contains_key("pxname") || !index.contains_key("svname") {
            return None;
        }
        Some(Self {
            index,
            named,
            raw: fields.len(),
        })
    }

    fn accepts(&self, len: usize) -> bool {
        len >= self.named && len <= self.raw.max(self.named) + 1
    }
}

struct Row<'a> {
    header: &'a Header,
    fields: Vec<&'a str>,
}

impl Row<'_> {
    fn str(&self, name: &str) -> &str {
        self.header
            .index
            .get(name)
            .and_then(|&i| self.fields.get(i))
            .copied()
            .unwrap_or("")
    }

    fn opt(&self, name: &str) -> Option<u64> {
        self.str(name).parse().ok()
    }

    fn num(&self, name: &str) -> u64 {
        self.opt(name).unwrap_or(0)
    }

    fn to_service(&self) -> Service {
        let status = Status::parse(self.str("status"));
        let check_status = if status == Status::NoCheck {
            "none".to_string()
        } else {
            self.str("check_status").to_string()
        };
        Service {
            proxy: self.str("pxname").to_string(),
            name: self.str("svname").to_string(),
            weight: self.opt("weight"),
            status,
            check_status,
            active: self.num("act"),
            backup: self.num("bck"),
            queue_cur: self.num("qcur"),
            queue_max: self.num("qmax"),
            queue_limit: self.opt("qlimit"),
            sessions_cur: self.num("scur"),
            sessions_max: self.num("smax"),
            sessions_limit: self.opt("slim"),
            sessions_total: self.num("stot"),
            lb_total: self.num("lbtot"),
            bytes_in: self.num("bin"),
            bytes_out: self.num("bout"),
            rate: self.num("rate"),
            rate_limit: self.opt("rate_lim"),
            rate_max: self.num("rate_max"),
            req_rate: self.num("req_rate"),
            req_rate_max: self.num("req_rate_max"),
            req_total: self.num("req_tot"),
            hrsp_1xx: self.num("hrsp_1xx"),
            hrsp_2xx: self.num("hrsp_2xx"),
            hrsp_3xx: self.num("hrsp_3xx"),
            hrsp_4xx: self.num("hrsp_4xx"),
            hrsp_5xx: self.num("hrsp_5xx"),
            hrsp_other: self.num("hrsp_other"),
            check_fail: self.num("chkfail"),
            check_down: self.num("chkdown"),
            last_change: self.opt("lastchg"),
            downtime: self.opt("downtime"),
            err_conn: self.num("econ"),
            err_req: self.num("ereq"),
            err_resp: self.num("eresp"),
            denied_req: self.num("dreq"),
            denied_resp: self.num("dresp"),
        }
    }
}

/// Parse a `show stat` response into proxies, preserving arrival order.
///
/// The first non-empty line is the header (a leading `# ` is tolerated).
/// Rows whose field count doesn't fit the header, or that lack a proxy or
/// service name, are skipped. A repeated (proxy, service) pair replaces the
/// earlier row in place.
pub fn parse_stats(raw: &str) -> Vec<Proxy> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next().and_then(Header::parse) else {
        return Vec::new();
    };

    let mut proxies: Vec<Proxy> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for line in lines {
        if line.trim_start().starts_with(COMMENT) {
            continue;
        }
        let fields: Vec<&str> = line.split(SEP).map(str::trim).collect();
        if !header.accepts(fields.len()) {
            skipped += 1;
            continue;
        }
        let row = Row {
            header: &header,
            fields,
        };
        let svc = row.to_service();
        if svc.proxy.is_empty() || svc.name.is_empty() {
            skipped += 1;
            continue;
        }

        let idx = *by_name.entry(svc.proxy.clone()).or_insert_with(|| {
            proxies.push(Proxy::new(svc.proxy.clone()));
            proxies.len() - 1
        });
        let proxy = &mut proxies[idx];
        match proxy.services.iter_mut().find(|s| s.name == svc.name) {
            Some(existing) => *existing = svc,
            None => proxy.services.push(svc),
        }
    }

    if skipped > 0 {
        debug!(skipped, "show stat: skipped malformed rows");
    }
    proxies
}

/// Parse a `show info` response. Unknown keys are ignored.
pub fn parse_info(raw: &str) -> NodeInfo {
    let mut info = NodeInfo::default();
    for line in raw.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let text = || Some(value.to_string());
        let num = || value.parse::<u64>().ok();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => info.software_name = text(),
            "version" => info.software_version = text(),
            "release_date" => info.release_date = text(),
            "node" => info.node = text(),
            "description" => info.description = text(),
            "uptime" => info.uptime = text(),
            "pid" => info.pid = num(),
            "process_num" => info.process_num = num(),
            "nbproc" => info.nbproc = num(),
            "maxconn" => info.max_conn = num(),
            "currconns" => info.cur_conn = num(),
            "maxpipes" => info.max_pipes = num(),
            "pipesused" => info.pipes_used = num(),
            "tasks" => info.tasks = num(),
            "run_queue" => info.run_queue = num(),
            _ => {}
        }
    }
    info
}
