//! Per-connection handler speaking the admin socket's line protocol.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, info};

use crate::state::AppState;

const UNKNOWN: &str = "Unknown command. Please enter one of the following commands only :\n\
  help           : this message\n\
  prompt         : toggle interactive mode with prompt\n\
  quit           : disconnect\n\
  show info      : report information about the running process\n\
  show stat      : report counters for each proxy and server\n\
  disable server : set a server in maintenance mode\n\
  enable server  : re-enable a server that was previously in maintenance mode\n\
  set weight     : change a server's weight\n";

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    TogglePrompt,
    Quit,
}

/// Run one command against the shared state.
pub async fn execute(line: &str, state: &AppState) -> Reply {
    let words: Vec<&str> = line.split_whitespace().collect();
    let text = match words.as_slice() {
        ["prompt"] => return Reply::TogglePrompt,
        ["quit"] => return Reply::Quit,
        ["show", "info"] => state.info.to_string(),
        ["show", "stat", ..] => {
            let mut table = state.table.lock().await;
            table.advance();
            table.render()
        }
        ["set", "weight", target, value] => {
            let mut table = state.table.lock().await;
            table.set_weight(target, value).err().unwrap_or_default()
        }
        ["set", "weight", ..] => "Require 'backend/server' and 'weight' or 'weight%'.\n".into(),
        [verb @ ("enable" | "disable"), "server", target] => {
            let mut table = state.table.lock().await;
            table
                .set_enabled(target, *verb == "enable")
                .err()
                .unwrap_or_default()
        }
        [] => String::new(),
        _ => UNKNOWN.into(),
    };
    Reply::Text(text)
}

/// Serve one client until it quits or hangs up.
///
/// Without `prompt` every command gets its output and the stream is closed.
/// In interactive mode each output is followed by an empty line and `> `.
pub async fn handle(stream: UnixStream, state: AppState) -> std::io::Result<()> {
    let (rd, mut wr) = stream.into_split();
    let mut lines = BufReader::new(rd).lines();
    let mut interactive = false;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        debug!(command = line, interactive, "command");
        match execute(line, &state).await {
            Reply::Quit => break,
            Reply::TogglePrompt => {
                interactive = !interactive;
                if !interactive {
                    continue;
                }
            }
            Reply::Text(text) => {
                if line.starts_with("set ") || line.contains(" server ") {
                    info!(command = line, result = text.trim(), "admin command");
                }
                wr.write_all(text.as_bytes()).await?;
                if !interactive {
                    break;
                }
            }
        }
        wr.write_all(b"\n> ").await?;
    }
    wr.shutdown().await
}
