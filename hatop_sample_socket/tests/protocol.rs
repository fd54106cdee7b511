//! Line protocol of the emulated admin socket, over a real unix socket.
use hatop_sample_socket::{serve, AppState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

async fn start() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin.sock");
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(serve(listener, AppState::default()));
    (dir, path)
}

/// Read until the interactive prompt shows up.
async fn until_prompt(s: &mut UnixStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.ends_with(b"\n> ") {
        let n = s.read(&mut chunk).await.unwrap();
        assert!(n > 0, "stream closed before prompt");
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn one_shot_command_closes_stream() {
    let (_dir, path) = start().await;
    let mut s = UnixStream::connect(&path).await.unwrap();
    s.write_all(b"show info\n").await.unwrap();
    let mut out = String::new();
    s.read_to_string(&mut out).await.unwrap();
    assert!(out.contains("Name: HAProxy"));
    assert!(!out.ends_with("> "));
}

#[tokio::test]
async fn interactive_session_applies_admin_commands() {
    let (_dir, path) = start().await;
    let mut s = UnixStream::connect(&path).await.unwrap();
    s.write_all(b"prompt\n").await.unwrap();
    assert_eq!(until_prompt(&mut s).await, "\n> ");

    s.write_all(b"set weight app/web1 7\n").await.unwrap();
    assert_eq!(until_prompt(&mut s).await, "\n> ");

    s.write_all(b"set weight app/nope 7\n").await.unwrap();
    assert!(until_prompt(&mut s).await.starts_with("No such server."));

    s.write_all(b"show stat\n").await.unwrap();
    let stat = until_prompt(&mut s).await;
    let row = stat
        .lines()
        .find(|l| l.starts_with("app,web1,"))
        .expect("web1 row");
    assert!(row.contains(",UP,7,"), "{row}");

    s.write_all(b"quit\n").await.unwrap();
    let mut rest = Vec::new();
    s.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}
