//! Scripted admin-socket peer shared by the integration tests.
#![allow(dead_code)]

use std::io;

use hatop::session::{SessionError, Transport};
use ratatui::{backend::TestBackend, Terminal};

pub const STAT: &str = "\
# pxname,svname,status,weight,scur,stot,bin,bout
app,web1,UP,100,3,100,1000,2000
app,web2,UP,100,1,90,900,1800
app,web3,DOWN,50,0,10,100,200
app,BACKEND,UP,200,4,200,2000,4000
static,static1,UP,10,0,5,50,60
static,BACKEND,UP,10,0,5,50,60
";

pub const INFO: &str = "Name: HAProxy\nVersion: 2.8.3\nPid: 77\nnode: test-lb\n";

/// Answers `show info` / `show stat` from fields and everything else with
/// `reply`; remembers every command it saw.
#[derive(Debug, Default)]
pub struct Scripted {
    pub info: String,
    pub stat: String,
    pub reply: String,
    pub unreachable: bool,
    pub sent: Vec<String>,
}

impl Scripted {
    pub fn new(stat: &str) -> Self {
        Self {
            info: INFO.to_string(),
            stat: stat.to_string(),
            ..Default::default()
        }
    }
}

impl Transport for Scripted {
    async fn request(&mut self, command: &str) -> Result<String, SessionError> {
        self.sent.push(command.to_string());
        if self.unreachable {
            return Err(SessionError::Unreachable {
                path: "/run/haproxy/admin.sock".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        Ok(match command {
            "show info" => self.info.clone(),
            "show stat" => self.stat.clone(),
            _ => self.reply.clone(),
        })
    }
}

pub fn terminal(w: u16, h: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(w, h)).expect("test terminal")
}

/// Screen rows as plain text.
pub fn screen(t: &Terminal<TestBackend>) -> Vec<String> {
    let buf = t.backend().buffer();
    buf.content()
        .chunks(buf.area.width as usize)
        .map(|row| row.iter().map(|c| c.symbol()).collect())
        .collect()
}
