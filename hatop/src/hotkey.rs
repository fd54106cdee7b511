//! Single-key admin actions on the selected server.

use thiserror::Error;
use tracing::info;

use crate::session::Transport;
use crate::shell::Shell;
use crate::types::Service;

/// Highest weight the balancer accepts.
pub const MAX_WEIGHT: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    RestoreWeight,
    WeightDown10,
    WeightDown1,
    WeightUp1,
    WeightUp10,
    Enable,
    Disable,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no selection")]
    NoSelection,
    #[error("admin commands are disabled in read-only mode")]
    ReadOnly,
}

impl Hotkey {
    pub fn label(self) -> &'static str {
        match self {
            Hotkey::RestoreWeight => "restore weight",
            Hotkey::WeightDown10 => "weight -10",
            Hotkey::WeightDown1 => "weight -1",
            Hotkey::WeightUp1 => "weight +1",
            Hotkey::WeightUp10 => "weight +10",
            Hotkey::Enable => "enable",
            Hotkey::Disable => "disable",
        }
    }

    fn step(self) -> i64 {
        match self {
            Hotkey::WeightDown10 => -10,
            Hotkey::WeightDown1 => -1,
            Hotkey::WeightUp1 => 1,
            Hotkey::WeightUp10 => 10,
            _ => 0,
        }
    }
}

/// Build the admin command for `hotkey` on `selected`.
pub fn dispatch(hotkey: Hotkey, selected: Option<&Service>) -> Result<String, DispatchError> {
    let svc = selected.ok_or(DispatchError::NoSelection)?;
    let target = svc.id();
    let cmd = match hotkey {
        Hotkey::RestoreWeight => format!("set weight {target} 100%"),
        Hotkey::Enable => format!("enable server {target}"),
        Hotkey::Disable => format!("disable server {target}"),
        _ => {
            let cur = svc.weight.unwrap_or(0) as i64;
            let next = (cur + hotkey.step()).clamp(0, MAX_WEIGHT as i64);
            format!("set weight {target} {next}")
        }
    };
    Ok(cmd)
}

/// Run a hotkey end to end: build the command, send it, log it to the shell.
///
/// Nothing is sent when there is no selection or in read-only mode.
pub async fn run<T: Transport>(
    hotkey: Hotkey,
    selected: Option<&Service>,
    read_only: bool,
    transport: &mut T,
    shell: &mut Shell,
) -> Result<String, DispatchError> {
    if read_only {
        return Err(DispatchError::ReadOnly);
    }
    let cmd = dispatch(hotkey, selected)?;
    info!(command = %cmd, action = hotkey.label(), "hotkey");
    let result = transport.request(&cmd).await;
    shell.log(&cmd, result);
    Ok(cmd)
}
