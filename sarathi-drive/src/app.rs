//! Process boundary: argument parsing and the startup sequence
//!
//! ```text
//! controller present? --no--> InputUnavailable
//!        |
//! discover target     --no--> ToyNotFound / NoToysFound
//!        |
//! connect             --no--> Connect
//!        |
//! control loop (until stopped or Ctrl-C), then teardown
//! ```
//!
//! Every startup failure is returned before the loop exists, so no toy
//! command is ever sent on a failed start.

use crate::config::Config;
use crate::control::ControlLoop;
use crate::core::discovery::{Scanner, ToyTarget};
use crate::core::input::InputSource;
use crate::error::{Error, Result};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

pub const USAGE: &str = "Usage: sarathi-drive <toy_name> <controller_index> <player_id>

  toy_name          advertised toy name, or '-' for the nearest toy
  controller_index  controller number (0 = first)
  player_id         player number 1-5, shown on the toy's display

Arguments after the third are ignored.";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchArgs {
    pub target: ToyTarget,
    pub controller_index: usize,
    pub player_id: u8,
}

/// Parse `args` (program name first). Trailing extras are logged and ignored.
pub fn parse_args(args: &[String]) -> Result<LaunchArgs> {
    let positional = args.get(1..).unwrap_or_default();
    let [name, index, player, rest @ ..] = positional else {
        return Err(Error::Usage(format!(
            "expected 3 arguments, got {}",
            positional.len()
        )));
    };
    if !rest.is_empty() {
        log::warn!("Ignoring {} extra argument(s): {:?}", rest.len(), rest);
    }

    let controller_index = index
        .parse::<usize>()
        .map_err(|_| Error::Usage(format!("invalid controller index '{}'", index)))?;
    let player_id = player
        .parse::<u8>()
        .map_err(|_| Error::Usage(format!("invalid player id '{}'", player)))?;

    Ok(LaunchArgs {
        target: ToyTarget::parse(name),
        controller_index,
        player_id,
    })
}

/// Bring up one session and drive it until it ends
pub fn run_session<F>(
    config: &Config,
    args: &LaunchArgs,
    scanner: &mut dyn Scanner,
    open_input: F,
    running: &AtomicBool,
) -> Result<()>
where
    F: FnOnce(usize) -> Result<Box<dyn InputSource>>,
{
    let input = open_input(args.controller_index)?;
    log::info!("Controller {} ready", args.controller_index);

    let handle = scanner.find(&args.target)?;
    log::info!("Found '{}' ({} dBm)", handle.name, handle.rssi);

    let toy = scanner.connect(&handle)?;

    let mut control = ControlLoop::new(config, args.player_id, toy, input, Instant::now());
    control.run(running);
    Ok(())
}
