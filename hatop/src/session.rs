//! Client for the balancer's admin unix socket.
//!
//! The socket is put into interactive mode with `prompt` once per connection;
//! every response then ends with a `> ` prompt. Peers that close the stream
//! after each command are handled too: end of stream terminates the response
//! and the next request reconnects.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

use crate::parser::{parse_info, parse_stats};
use crate::types::{NodeInfo, Proxy};

pub const PROMPT: &[u8] = b"> ";
const READ_CHUNK: usize = 4096;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot reach {}: {source}", path.display())]
    Unreachable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("connection closed by peer")]
    Closed,
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("socket i/o: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SessionError::Unreachable { .. })
    }

    /// The stream was closed or reset under us; a timeout is not.
    fn is_dead_connection(&self) -> bool {
        matches!(self, SessionError::Closed | SessionError::Io(_))
    }
}

/// Progress of reading one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Nothing received yet.
    AwaitingHeader,
    /// Some bytes received, terminator not seen.
    AwaitingBody,
    Complete,
}

/// Accumulates partial reads until the prompt (or end of stream) is seen.
#[derive(Debug)]
pub struct ResponseBuffer {
    buf: Vec<u8>,
    state: ReadState,
    prompted: bool,
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(READ_CHUNK),
            state: ReadState::AwaitingHeader,
            prompted: false,
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Whether the response ended with a prompt rather than end of stream.
    pub fn prompted(&self) -> bool {
        self.prompted
    }

    pub fn feed(&mut self, chunk: &[u8]) -> ReadState {
        if self.state == ReadState::Complete || chunk.is_empty() {
            return self.state;
        }
        self.buf.extend_from_slice(chunk);
        let body_len = self.buf.len().saturating_sub(PROMPT.len());
        let ends_with_prompt = self.buf.as_slice() == PROMPT
            || (self.buf.ends_with(PROMPT) && self.buf[..body_len].ends_with(b"\n"));
        if ends_with_prompt {
            self.prompted = true;
            self.state = ReadState::Complete;
        } else {
            self.state = ReadState::AwaitingBody;
        }
        self.state
    }

    /// The peer closed the stream.
    pub fn eof(&mut self) -> ReadState {
        self.state = ReadState::Complete;
        self.state
    }

    /// Response text without the trailing prompt and blank lines.
    pub fn into_text(self) -> String {
        let mut bytes = self.buf;
        if self.prompted {
            bytes.truncate(bytes.len() - PROMPT.len());
        }
        let text = String::from_utf8_lossy(&bytes);
        text.trim_end().to_string()
    }
}

/// Anything that can answer an admin command. The event loop, shell and
/// hotkeys only see this, so tests can substitute a scripted peer.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request(&mut self, command: &str) -> Result<String, SessionError>;
}

pub struct Session {
    path: PathBuf,
    timeout: Duration,
    stream: Option<UnixStream>,
    // false once the peer showed it closes after every command
    interactive: bool,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            stream: None,
            interactive: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn open(&self) -> Result<UnixStream, SessionError> {
        match timeout(self.timeout, UnixStream::connect(&self.path)).await {
            Ok(Ok(s)) => Ok(s),
            Ok(Err(source)) => Err(SessionError::Unreachable {
                path: self.path.clone(),
                source,
            }),
            Err(_) => Err(SessionError::Timeout(self.timeout)),
        }
    }

    /// Open the socket and switch it to interactive mode.
    ///
    /// Only `prompt` is sent; the peer's idle timeout is left as configured.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        self.stream = None;
        let mut stream = self.open().await?;
        let deadline = Instant::now() + self.timeout;
        write_line(&mut stream, "prompt", deadline, self.timeout).await?;
        let greeting = read_response(&mut stream, deadline, self.timeout).await?;
        if greeting.prompted() {
            self.interactive = true;
            self.stream = Some(stream);
            debug!(path = %self.path.display(), "admin socket connected (interactive)");
        } else {
            self.interactive = false;
            debug!(path = %self.path.display(), "admin socket closes per command");
        }
        Ok(())
    }

    /// Send one command and wait for its complete response.
    ///
    /// At most one request is in flight; the whole exchange is bounded by
    /// the session timeout.
    pub async fn request(&mut self, command: &str) -> Result<String, SessionError> {
        let res = self.exchange(command).await;
        if let Err(e) = &res {
            warn!(command, error = %e, "admin socket request failed");
            self.stream = None;
        }
        res
    }

    /// A kept connection may have been closed by the peer's idle timeout
    /// since the last request; that case gets one fresh connection.
    async fn exchange(&mut self, command: &str) -> Result<String, SessionError> {
        let reused = self.stream.is_some();
        match self.send(command).await {
            Err(e) if reused && e.is_dead_connection() => {
                debug!(command, error = %e, "kept connection is gone, reconnecting");
                self.stream = None;
                self.send(command).await
            }
            res => res,
        }
    }

    async fn send(&mut self, command: &str) -> Result<String, SessionError> {
        if self.stream.is_none() {
            if self.interactive {
                self.connect().await?;
            }
            if self.stream.is_none() {
                self.stream = Some(self.open().await?);
            }
        }
        let limit = self.timeout;
        let deadline = Instant::now() + limit;
        let Some(stream) = self.stream.as_mut() else {
            return Err(SessionError::Closed);
        };
        write_line(stream, command, deadline, limit).await?;
        let resp = read_response(stream, deadline, limit).await?;
        if !resp.prompted() {
            // peer closed the stream; reconnect next time
            self.stream = None;
            if resp.state() == ReadState::Complete && resp.buf.is_empty() && self.interactive {
                return Err(SessionError::Closed);
            }
        }
        Ok(resp.into_text())
    }

    /// Leave interactive mode politely and drop the connection.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let deadline = Instant::now() + self.timeout;
            let _ = write_line(&mut stream, "quit", deadline, self.timeout).await;
            let _ = stream.shutdown().await;
        }
    }
}

impl Transport for Session {
    async fn request(&mut self, command: &str) -> Result<String, SessionError> {
        Session::request(self, command).await
    }
}

async fn write_line(
    stream: &mut UnixStream,
    command: &str,
    deadline: Instant,
    limit: Duration,
) -> Result<(), SessionError> {
    let mut line = Vec::with_capacity(command.len() + 1);
    line.extend_from_slice(command.trim_end_matches(|c| c == '\r' || c == '\n').as_bytes());
    line.push(b'\n');
    match timeout_at(deadline, stream.write_all(&line)).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(SessionError::Timeout(limit)),
    }
}

async fn read_response(
    stream: &mut UnixStream,
    deadline: Instant,
    limit: Duration,
) -> Result<ResponseBuffer, SessionError> {
    let mut resp = ResponseBuffer::new();
    let mut chunk = [0u8; READ_CHUNK];
    while resp.state() != ReadState::Complete {
        let n = match timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(res) => res?,
            Err(_) => return Err(SessionError::Timeout(limit)),
        };
        if n == 0 {
            resp.eof();
        } else {
            resp.feed(&chunk[..n]);
        }
    }
    Ok(resp)
}

/// Fetch and decode `show info`.
pub async fn request_info<T: Transport>(t: &mut T) -> Result<NodeInfo, SessionError> {
    let raw = t.request("show info").await?;
    Ok(parse_info(&raw))
}

/// Fetch and decode `show stat`. An empty result means the data is stale.
pub async fn request_stats<T: Transport>(t: &mut T) -> Result<Vec<Proxy>, SessionError> {
    let raw = t.request("show stat").await?;
    Ok(parse_stats(&raw))
}
