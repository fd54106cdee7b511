//! Socket session against real unix sockets: the sample emulator and
//! hand-written misbehaving peers.
use std::path::PathBuf;
use std::time::Duration;

use hatop::hotkey::{self, Hotkey};
use hatop::session::{request_info, request_stats, Session, SessionError};
use hatop::shell::Shell;
use hatop::types::Status;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

const T: Duration = Duration::from_millis(500);

fn sock_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("admin.sock")
}

async fn sample_socket() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = sock_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(hatop_sample_socket::serve(
        listener,
        hatop_sample_socket::AppState::default(),
    ));
    (dir, path)
}

#[tokio::test]
async fn interactive_session_polls_and_administers() {
    let (_dir, path) = sample_socket().await;
    let mut s = Session::new(&path, T);
    s.connect().await.unwrap();
    assert!(s.is_connected());

    let info = request_info(&mut s).await.unwrap();
    assert_eq!(info.node.as_deref(), Some("lb-sample-01"));
    let proxies = request_stats(&mut s).await.unwrap();
    let app = proxies.iter().find(|p| p.name == "app").unwrap();
    let web1 = app.service("web1").unwrap().clone();
    assert_eq!(web1.status, Status::Up);

    let mut shell = Shell::new();
    let cmd = hotkey::run(Hotkey::Disable, Some(&web1), false, &mut s, &mut shell)
        .await
        .unwrap();
    assert_eq!(cmd, "disable server app/web1");
    // success is silent
    assert_eq!(shell.scrollback.render_lines(), ["> disable server app/web1"]);

    let proxies = request_stats(&mut s).await.unwrap();
    let app = proxies.iter().find(|p| p.name == "app").unwrap();
    assert_eq!(app.service("web1").unwrap().status, Status::Maint);
    // still the same connection
    assert!(s.is_connected());
    s.close().await;
    assert!(!s.is_connected());
}

#[tokio::test]
async fn rejected_command_text_is_returned_verbatim() {
    let (_dir, path) = sample_socket().await;
    let mut s = Session::new(&path, T);
    s.connect().await.unwrap();
    let out = s.request("set weight app/ghost 10").await.unwrap();
    assert_eq!(out, "No such server.");
}

#[tokio::test]
async fn missing_socket_is_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = Session::new(sock_path(&dir), T);
    let err = s.connect().await.unwrap_err();
    assert!(err.is_unreachable(), "{err}");
    assert!(s.request("show info").await.unwrap_err().is_unreachable());
}

#[tokio::test]
async fn peer_that_closes_after_each_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = sock_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { return };
            let (rd, mut wr) = stream.into_split();
            let mut line = String::new();
            let _ = BufReader::new(rd).read_line(&mut line).await;
            let reply = match line.trim() {
                "show info" => "Name: HAProxy\nPid: 9\n",
                _ => "Unknown command.\n",
            };
            let _ = wr.write_all(reply.as_bytes()).await;
            let _ = wr.shutdown().await;
        }
    });

    let mut s = Session::new(&path, T);
    s.connect().await.unwrap();
    assert!(!s.is_connected());
    let info = request_info(&mut s).await.unwrap();
    assert_eq!(info.pid, Some(9));
    let again = request_info(&mut s).await.unwrap();
    assert_eq!(again.pid, Some(9));
}

#[tokio::test]
async fn prompt_split_across_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = sock_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else { return };
        let (rd, mut wr) = stream.into_split();
        let mut lines = BufReader::new(rd).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line == "prompt" {
                let _ = wr.write_all(b"\n> ").await;
                continue;
            }
            for part in [&b"Name: HAP"[..], b"roxy\n", b"\n", b">", b" "] {
                let _ = wr.write_all(part).await;
                let _ = wr.flush().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    });

    let mut s = Session::new(&path, T);
    s.connect().await.unwrap();
    assert_eq!(s.request("show info").await.unwrap(), "Name: HAProxy");
    assert!(s.is_connected());
}

#[tokio::test]
async fn silent_peer_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = sock_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        // accept and never answer
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut s = Session::new(&path, Duration::from_millis(100));
    let err = s.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Timeout(_)), "{err}");
}

#[tokio::test]
async fn idle_closed_connection_is_reopened_for_the_next_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = sock_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (rd, mut wr) = stream.into_split();
                let mut lines = BufReader::new(rd).lines();
                // hang up after 100ms without a command, like the cli timeout
                while let Ok(Ok(Some(line))) =
                    tokio::time::timeout(Duration::from_millis(100), lines.next_line()).await
                {
                    let reply: &[u8] = match line.as_str() {
                        "prompt" => b"\n> ",
                        "show info" => b"Name: HAProxy\nPid: 9\n\n> ",
                        _ => b"Unknown command.\n\n> ",
                    };
                    let _ = wr.write_all(reply).await;
                }
                let _ = wr.shutdown().await;
            });
        }
    });

    let mut s = Session::new(&path, T);
    s.connect().await.unwrap();
    assert!(s.is_connected());
    tokio::time::sleep(Duration::from_millis(300)).await;

    let info = request_info(&mut s).await.unwrap();
    assert_eq!(info.pid, Some(9));
    assert!(s.is_connected());

    tokio::time::sleep(Duration::from_millis(300)).await;
    let mut shell = Shell::new();
    shell.input.insert_str("show info");
    assert!(shell.submit(&mut s).await);
    assert_eq!(
        shell.scrollback.render_lines(),
        ["> show info", "Name: HAProxy", "Pid: 9"]
    );
}
