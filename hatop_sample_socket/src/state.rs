//! Shared emulator state: static `show info` text and a mutable stat table.

use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_INFO: &str = include_str!("../samples/info.txt");
pub const DEFAULT_STAT: &str = include_str!("../samples/stat.csv");

const MAX_WEIGHT: u64 = 256;

#[derive(Debug, Clone)]
struct Row {
    cells: Vec<String>,
    initial_weight: u64,
}

/// The `show stat` table, kept as text cells so it round-trips untouched.
#[derive(Debug, Clone)]
pub struct StatTable {
    header: String,
    fields: Vec<String>,
    rows: Vec<Row>,
}

fn is_aggregate(sv: &str) -> bool {
    sv == "FRONTEND" || sv == "BACKEND"
}

impl StatTable {
    pub fn parse(csv: &str) -> Self {
        let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().unwrap_or("# pxname,svname,").to_string();
        let fields: Vec<String> = header
            .trim_start_matches('#')
            .trim()
            .split(',')
            .map(str::to_string)
            .collect();
        let mut table = StatTable {
            header,
            fields,
            rows: Vec::new(),
        };
        for line in lines {
            let mut cells: Vec<String> = line.split(',').map(str::to_string).collect();
            cells.resize(table.fields.len(), String::new());
            let initial_weight = table
                .col("weight")
                .and_then(|i| cells[i].parse().ok())
                .unwrap_or(0);
            table.rows.push(Row {
                cells,
                initial_weight,
            });
        }
        table
    }

    fn col(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn get(&self, px: &str, sv: &str, field: &str) -> Option<&str> {
        let (ipx, isv, i) = (self.col("pxname")?, self.col("svname")?, self.col(field)?);
        self.rows
            .iter()
            .find(|r| r.cells[ipx] == px && r.cells[isv] == sv)
            .map(|r| r.cells[i].as_str())
    }

    fn set(row: &mut Row, idx: Option<usize>, value: String) {
        if let Some(i) = idx {
            row.cells[i] = value;
        }
    }

    /// Index of the server named by `px/sv`, with the balancer's error text.
    fn server(&self, target: &str) -> Result<usize, String> {
        let (ipx, isv) = match (self.col("pxname"), self.col("svname")) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err("No such backend.\n".into()),
        };
        let Some((px, sv)) = target.split_once('/') else {
            return Err("Require 'backend/server'.\n".into());
        };
        if !self.rows.iter().any(|r| r.cells[ipx] == px) {
            return Err("No such backend.\n".into());
        }
        self.rows
            .iter()
            .position(|r| r.cells[ipx] == px && r.cells[isv] == sv && !is_aggregate(sv))
            .ok_or_else(|| "No such server.\n".into())
    }

    /// `set weight px/sv N` or `N%` (relative to the configured weight).
    pub fn set_weight(&mut self, target: &str, value: &str) -> Result<(), String> {
        let idx = self.server(target)?;
        let weight = if let Some(pct) = value.strip_suffix('%') {
            let pct: u64 = pct
                .parse()
                .map_err(|_| "Require <weight> or <weight%>.\n".to_string())?;
            self.rows[idx].initial_weight * pct / 100
        } else {
            value
                .parse()
                .map_err(|_| "Require <weight> or <weight%>.\n".to_string())?
        };
        if weight > MAX_WEIGHT {
            return Err("Immediate value must be between 0 and 256.\n".into());
        }
        let w = self.col("weight");
        Self::set(&mut self.rows[idx], w, weight.to_string());
        self.recompute_backend(idx);
        Ok(())
    }

    pub fn set_enabled(&mut self, target: &str, enabled: bool) -> Result<(), String> {
        let idx = self.server(target)?;
        let status = if enabled { "UP" } else { "MAINT" };
        let s = self.col("status");
        Self::set(&mut self.rows[idx], s, status.to_string());
        self.recompute_backend(idx);
        Ok(())
    }

    /// BACKEND weight is the sum of its active servers that are UP.
    fn recompute_backend(&mut self, server_idx: usize) {
        let (Some(ipx), Some(isv), Some(ist), Some(iw), Some(ibck)) = (
            self.col("pxname"),
            self.col("svname"),
            self.col("status"),
            self.col("weight"),
            self.col("bck"),
        ) else {
            return;
        };
        let px = self.rows[server_idx].cells[ipx].clone();
        let total: u64 = self
            .rows
            .iter()
            .filter(|r| r.cells[ipx] == px && !is_aggregate(&r.cells[isv]))
            .filter(|r| r.cells[ist].starts_with("UP") && r.cells[ibck] != "1")
            .filter_map(|r| r.cells[iw].parse::<u64>().ok())
            .sum();
        if let Some(be) = self
            .rows
            .iter_mut()
            .find(|r| r.cells[ipx] == px && r.cells[isv] == "BACKEND")
        {
            be.cells[iw] = total.to_string();
        }
    }

    /// Let traffic flow between two polls so rates are not all zero.
    pub fn advance(&mut self) {
        let ist = self.col("status");
        let bumps: Vec<(Option<usize>, u64)> = [
            ("stot", 3),
            ("lbtot", 3),
            ("bin", 4_500),
            ("bout", 96_000),
            ("hrsp_2xx", 3),
            ("req_tot", 3),
        ]
        .into_iter()
        .map(|(name, step)| (self.col(name), step))
        .collect();
        for (n, row) in self.rows.iter_mut().enumerate() {
            let alive = ist
                .map(|i| row.cells[i].starts_with("UP") || row.cells[i] == "OPEN")
                .unwrap_or(true);
            if !alive {
                continue;
            }
            let k = 1 + (n as u64 % 4);
            for (idx, step) in &bumps {
                if let Some(i) = idx {
                    if let Ok(v) = row.cells[*i].parse::<u64>() {
                        row.cells[*i] = (v + step * k).to_string();
                    }
                }
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.header.len() * (self.rows.len() + 1));
        out.push_str(&self.header);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.cells.join(","));
            out.push('\n');
        }
        out
    }
}

#[derive(Clone)]
pub struct AppState {
    pub info: Arc<str>,
    pub table: Arc<Mutex<StatTable>>,
}

impl AppState {
    pub fn new(info: &str, stat_csv: &str) -> Self {
        Self {
            info: Arc::from(info),
            table: Arc::new(Mutex::new(StatTable::parse(stat_csv))),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_INFO, DEFAULT_STAT)
    }
}
