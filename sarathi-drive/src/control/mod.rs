//! Teleoperation control loop and its embedded state machines.
//!
//! ```text
//! every tick (~20ms):
//!   sample input -> battery check -> sequence detector -> presets
//!   -> calibration / motion command -> auto-straighten -> player glyph
//! ```
//!
//! - [`session`]: Per-robot mutable state with controlled setters
//! - [`sequence`]: Button-sequence matcher (cheat code)
//! - [`calibration`]: Hold-to-aim heading reference trimming
//! - [`battery`]: Periodic voltage check mapped to an LED colour
//! - [`motion`]: Stick-to-heading mapping and drift correction
//! - [`scheduler`]: Deadline-based tick pacing
//! - [`control_loop`]: The orchestrator

pub mod battery;
pub mod calibration;
pub mod control_loop;
pub mod motion;
pub mod scheduler;
pub mod sequence;
pub mod session;

pub use battery::{BatteryMonitor, battery_color};
pub use calibration::CalibrationState;
pub use control_loop::ControlLoop;
pub use motion::MotionCommand;
pub use scheduler::TickScheduler;
pub use sequence::SequenceDetector;
pub use session::ControllerSession;

use crate::error::Result;

/// Resolve one toy call: recoverable failures are logged and dropped,
/// fatal ones also end the session.
pub(crate) fn settle<T>(session: &mut ControllerSession, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_fatal() => {
            log::error!("Player {}: {}; ending session", session.player_id(), e);
            session.stop();
            None
        }
        Err(e) => {
            log::warn!("Player {}: {}", session.player_id(), e);
            None
        }
    }
}
