//! Entry point for the hatop TUI. Parses args, checks the socket and runs the App.

use std::{env, fs, io, os::unix::fs::FileTypeExt, path::Path, process::ExitCode, time::Duration};

use hatop::app::App;
use hatop::config::{load_profiles, parse_args, resolve, save_profiles, usage, ProfileUpdate};
use hatop::logging;
use hatop::session::{Session, SessionError};
use tracing::info;

const EXIT_USAGE: u8 = 1;
const EXIT_SOCKET_PATH: u8 = 2;
const EXIT_SOCKET_ERROR: u8 = 3;

/// Upper bound for connecting and for one request/response exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

fn check_socket_path(path: &Path) -> Result<(), String> {
    let meta = fs::metadata(path).map_err(|e| format!("{}: {e}", path.display()))?;
    if !meta.file_type().is_socket() {
        return Err(format!("{} is not a unix socket", path.display()));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let prog = env::args().next().unwrap_or_else(|| "hatop".into());
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{prog}: {msg}\n\n{}", usage(&prog));
            return ExitCode::from(EXIT_USAGE);
        }
    };
    if parsed.help {
        println!("{}", usage(&prog));
        return ExitCode::SUCCESS;
    }

    let mut profiles = load_profiles();
    let (settings, update) = match resolve(&parsed, &mut profiles) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{prog}: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    match update {
        ProfileUpdate::Created | ProfileUpdate::Overwritten => {
            if let Err(e) = save_profiles(&profiles) {
                eprintln!("{prog}: warning: {e}");
            }
        }
        ProfileUpdate::Kept => {
            eprintln!(
                "{prog}: profile '{}' differs from the given options; pass --save to overwrite it",
                parsed.profile.as_deref().unwrap_or_default()
            );
        }
        ProfileUpdate::Unchanged => {}
    }

    if let Err(e) = logging::init(parsed.log_file.as_deref()) {
        eprintln!("{prog}: cannot set up logging: {e}");
        return ExitCode::from(EXIT_USAGE);
    }

    if let Err(msg) = check_socket_path(&settings.socket) {
        eprintln!("{prog}: {msg}");
        return ExitCode::from(EXIT_SOCKET_PATH);
    }

    let mut session = Session::new(&settings.socket, REQUEST_TIMEOUT);
    if let Err(e) = session.connect().await {
        eprintln!("{prog}: {e}");
        let denied = matches!(
            &e,
            SessionError::Unreachable { source, .. } if source.kind() == io::ErrorKind::PermissionDenied
        );
        return ExitCode::from(if denied { EXIT_SOCKET_PATH } else { EXIT_SOCKET_ERROR });
    }
    info!(
        socket = %settings.socket.display(),
        interval = ?settings.interval,
        mode = %settings.mode,
        read_only = settings.read_only,
        "starting"
    );

    let mut app = App::new(session, settings.interval, settings.mode, settings.read_only);
    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{prog}: {e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}
