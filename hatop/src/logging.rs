//! Tracing setup. The dashboard owns the terminal, so logs go to a file or nowhere.

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "HATOP_LOG_FILE";

/// `--log-file` wins over `HATOP_LOG_FILE`.
pub fn log_target(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_FILE_ENV).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty())
}

/// Install the global subscriber. Fails when the log file cannot be opened
/// or a subscriber is already installed.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_target(log_file) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(io::Error::other)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init()
                .map_err(io::Error::other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_the_installed_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hatop.log");
        init(Some(&path)).unwrap();
        assert!(path.exists());
        tracing::info!("logging ready");
        assert!(init(None).is_err());
    }
}
