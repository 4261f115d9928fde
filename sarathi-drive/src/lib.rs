//! SarathiDrive - gamepad teleoperation for spherical toy robots
//!
//! One control loop per robot/controller pair samples the controller at a
//! fixed rate and turns it into heading/speed commands, with a cheat-code
//! detector, a hold-to-aim calibration mode, periodic battery indication
//! and closed-loop heading correction.
//!
//! ## Features
//!
//! - `gamepad`: physical controllers via `gilrs` (needs libudev on Linux)

pub mod app;
pub mod config;
pub mod control;
pub mod core;
pub mod devices;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use control::{ControlLoop, ControllerSession};
pub use error::{Error, Result};
