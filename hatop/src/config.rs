//! Startup configuration: command line arguments and saved profiles.
//!
//! Profiles are a JSON map of name -> { socket, interval, mode, read_only },
//! stored under $XDG_CONFIG_HOME/hatop/profiles.json (fallback ~/.config/hatop/profiles.json).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::mode::Mode;

pub const DEFAULT_INTERVAL: u64 = 1;
pub const MIN_INTERVAL: u64 = 1;
pub const MAX_INTERVAL: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid update interval {0} (allowed: 1-30 seconds)")]
    Interval(u64),
    #[error("invalid mode {0} (allowed: 1-5)")]
    Mode(u32),
    #[error("mode 5 (CLI) is not available in read-only mode")]
    ReadOnlyCli,
    #[error("no admin socket given (use -s PATH or a saved profile)")]
    NoSocket,
    #[error("unknown profile '{0}' (give -s PATH to create it)")]
    UnknownProfile(String),
    #[error("cannot write {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} -s SOCKET [-i INTERVAL] [-m MODE] [-n] [--profile NAME|-P NAME] [--save] [--log-file PATH]\n\
         \n\
         Options:\n\
         \x20 -s, --unix-socket PATH     path to the haproxy admin unix socket\n\
         \x20 -i, --update-interval SECS refresh interval, {MIN_INTERVAL}-{MAX_INTERVAL} seconds (default {DEFAULT_INTERVAL})\n\
         \x20 -m, --mode N               initial mode: 1=STATUS 2=TRAFFIC 3=HTTP 4=ERRORS 5=CLI (default 1)\n\
         \x20 -n, --read-only            disable the CLI and the admin hotkeys\n\
         \x20 -P, --profile NAME         load a saved profile, or save the given options under NAME\n\
         \x20     --save                 overwrite an existing profile without asking\n\
         \x20     --log-file PATH        append logs to PATH (also HATOP_LOG_FILE; filter with RUST_LOG)\n\
         \x20 -h, --help                 show this help"
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub socket: Option<PathBuf>,
    pub interval: Option<u64>,
    pub mode: Option<u32>,
    pub read_only: bool,
    pub profile: Option<String>,
    pub save: bool,
    pub log_file: Option<PathBuf>,
    pub help: bool,
}

fn number<T: std::str::FromStr>(flag: &str, v: Option<String>) -> Result<T, String> {
    let v = v.ok_or_else(|| format!("{flag} needs a value"))?;
    v.parse()
        .map_err(|_| format!("{flag}: '{v}' is not a number"))
}

/// Parse `argv` (program name first). `Err` carries the message to print.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let _prog = it.next();
    let mut out = ParsedArgs::default();

    while let Some(arg) = it.next() {
        // --flag=value
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = || inline.clone().or_else(|| it.next());
        match flag.as_str() {
            "-h" | "--help" => out.help = true,
            "-s" | "--unix-socket" => {
                let v = value().ok_or_else(|| format!("{flag} needs a value"))?;
                out.socket = Some(PathBuf::from(v));
            }
            "-i" | "--update-interval" => out.interval = Some(number(&flag, value())?),
            "-m" | "--mode" => out.mode = Some(number(&flag, value())?),
            "-n" | "--read-only" => out.read_only = true,
            "-P" | "--profile" => {
                out.profile = Some(value().ok_or_else(|| format!("{flag} needs a value"))?);
            }
            "--save" => out.save = true,
            "--log-file" => {
                let v = value().ok_or_else(|| format!("{flag} needs a value"))?;
                out.log_file = Some(PathBuf::from(v));
            }
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntry {
    pub socket: PathBuf,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_mode")]
    pub mode: u32,
    #[serde(default)]
    pub read_only: bool,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL
}

fn default_mode() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("hatop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hatop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing or unreadable file is an empty profile set.
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> Result<(), ConfigError> {
    let path = profiles_path();
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
        fs::write(&path, data)
    };
    write().map_err(|source| ConfigError::Save {
        path: path.clone(),
        source,
    })
}

pub enum ResolveProfile {
    /// Options from the command line, not tied to a profile.
    Direct(ProfileEntry),
    /// Options from the command line, to be stored under the name.
    Store(String, ProfileEntry),
    /// Loaded from an existing profile.
    Loaded(ProfileEntry),
}

pub struct ProfileRequest<'a> {
    pub args: &'a ParsedArgs,
}

impl ProfileRequest<'_> {
    pub fn resolve(&self, pf: &ProfilesFile) -> Result<ResolveProfile, ConfigError> {
        let args = self.args;
        if let Some(socket) = &args.socket {
            let entry = ProfileEntry {
                socket: socket.clone(),
                interval: args.interval.unwrap_or(DEFAULT_INTERVAL),
                mode: args.mode.unwrap_or(1),
                read_only: args.read_only,
            };
            return Ok(match &args.profile {
                Some(name) => ResolveProfile::Store(name.clone(), entry),
                None => ResolveProfile::Direct(entry),
            });
        }
        let Some(name) = &args.profile else {
            return Err(ConfigError::NoSocket);
        };
        let Some(saved) = pf.profiles.get(name) else {
            return Err(ConfigError::UnknownProfile(name.clone()));
        };
        // explicit flags still override the saved values for this run
        Ok(ResolveProfile::Loaded(ProfileEntry {
            socket: saved.socket.clone(),
            interval: args.interval.unwrap_or(saved.interval),
            mode: args.mode.unwrap_or(saved.mode),
            read_only: args.read_only || saved.read_only,
        }))
    }
}

/// What happened to the profiles file while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    Unchanged,
    Created,
    Overwritten,
    /// Differs from the saved profile but `--save` was not given.
    Kept,
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub socket: PathBuf,
    pub interval: Duration,
    pub mode: Mode,
    pub read_only: bool,
}

impl TryFrom<&ProfileEntry> for Settings {
    type Error = ConfigError;

    fn try_from(e: &ProfileEntry) -> Result<Self, Self::Error> {
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&e.interval) {
            return Err(ConfigError::Interval(e.interval));
        }
        let mode = Mode::from_number(e.mode).ok_or(ConfigError::Mode(e.mode))?;
        if e.read_only && mode == Mode::Cli {
            return Err(ConfigError::ReadOnlyCli);
        }
        Ok(Settings {
            socket: e.socket.clone(),
            interval: Duration::from_secs(e.interval),
            mode,
            read_only: e.read_only,
        })
    }
}

/// Resolve the final settings and update `pf` in memory when a profile is
/// created or overwritten. Invalid values are rejected before anything is
/// stored.
pub fn resolve(args: &ParsedArgs, pf: &mut ProfilesFile) -> Result<(Settings, ProfileUpdate), ConfigError> {
    match (ProfileRequest { args }).resolve(pf)? {
        ResolveProfile::Direct(entry) | ResolveProfile::Loaded(entry) => {
            Ok((Settings::try_from(&entry)?, ProfileUpdate::Unchanged))
        }
        ResolveProfile::Store(name, entry) => {
            let settings = Settings::try_from(&entry)?;
            let update = match pf.profiles.get(&name) {
                None => ProfileUpdate::Created,
                Some(saved) if *saved == entry => ProfileUpdate::Unchanged,
                Some(_) if args.save => ProfileUpdate::Overwritten,
                Some(_) => ProfileUpdate::Kept,
            };
            if matches!(update, ProfileUpdate::Created | ProfileUpdate::Overwritten) {
                pf.profiles.insert(name, entry);
            }
            Ok((settings, update))
        }
    }
}
