//! hatop: interactive dashboard and admin client for the HAProxy unix socket.

pub mod app;
pub mod config;
pub mod hotkey;
pub mod logging;
pub mod mode;
pub mod parser;
pub mod session;
pub mod shell;
pub mod store;
pub mod types;
pub mod ui;
