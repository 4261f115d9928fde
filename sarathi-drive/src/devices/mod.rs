//! Device implementations
//!
//! - [`sim`]: simulated toys and discovery (the default backend)
//! - [`mock`]: recording test doubles
//! - `gamepad`: physical controller, behind the `gamepad` feature

pub mod mock;
pub mod sim;

#[cfg(feature = "gamepad")]
pub mod gamepad;

use crate::config::Config;
use crate::core::discovery::Scanner;
use crate::core::input::InputSource;
use crate::error::Result;

/// Create the discovery backend
pub fn create_scanner(config: &Config) -> Box<dyn Scanner> {
    Box::new(sim::SimScanner::new(config.sim.clone()))
}

/// Open the controller at `index`
#[cfg(feature = "gamepad")]
pub fn open_input(index: usize) -> Result<Box<dyn InputSource>> {
    Ok(Box::new(gamepad::GamepadInput::open(index)?))
}

/// Open the controller at `index`
#[cfg(not(feature = "gamepad"))]
pub fn open_input(index: usize) -> Result<Box<dyn InputSource>> {
    Err(crate::error::Error::InputUnavailable(format!(
        "controller {}: built without the `gamepad` feature",
        index
    )))
}
