//! hatop_sample_socket: serve sample `show info`/`show stat` data on a unix socket.

use std::{fs, path::PathBuf};

use anyhow::Context;
use hatop_sample_socket::{serve, state, AppState};
use tokio::net::UnixListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SOCKET: &str = "/tmp/hatop-sample.sock";

struct Args {
    socket: PathBuf,
    info: Option<PathBuf>,
    stat: Option<PathBuf>,
}

fn usage(prog: &str) -> String {
    format!("Usage: {prog} [--socket PATH|-s PATH] [--info FILE] [--stat FILE]")
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hatop_sample_socket".into());
    let mut out = Args {
        socket: PathBuf::from(DEFAULT_SOCKET),
        info: None,
        stat: None,
    };
    while let Some(a) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("{a} needs a value\n{}", usage(&prog)));
        match a.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "-s" | "--socket" => out.socket = PathBuf::from(value()?),
            "--info" => out.info = Some(PathBuf::from(value()?)),
            "--stat" => out.stat = Some(PathBuf::from(value()?)),
            _ if a.starts_with("--socket=") => {
                if let Some((_, v)) = a.split_once('=') {
                    out.socket = PathBuf::from(v);
                }
            }
            _ => return Err(format!("unexpected argument '{a}'\n{}", usage(&prog))),
        }
    }
    Ok(out)
}

fn read_or(path: Option<&PathBuf>, fallback: &str) -> anyhow::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => Ok(fallback.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args()) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let info_text = read_or(args.info.as_ref(), state::DEFAULT_INFO)?;
    let stat_text = read_or(args.stat.as_ref(), state::DEFAULT_STAT)?;
    let app = AppState::new(&info_text, &stat_text);

    // a previous run may have left the socket file behind
    let _ = fs::remove_file(&args.socket);
    let listener = UnixListener::bind(&args.socket)
        .with_context(|| format!("binding {}", args.socket.display()))?;
    info!(socket = %args.socket.display(), "sample admin socket listening");

    let res = tokio::select! {
        r = serve(listener, app) => r.context("accept failed"),
        _ = tokio::signal::ctrl_c() => Ok(()),
    };
    let _ = fs::remove_file(&args.socket);
    res
}
