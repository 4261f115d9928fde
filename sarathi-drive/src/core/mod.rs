//! Core abstractions for the teleoperation loop.
//!
//! - [`input::InputSource`]: Trait to implement for a new controller backend
//! - [`actuator::ToyActuator`]: Trait to implement for a new robot backend
//! - [`discovery::Scanner`]: Finds toys and opens actuator sessions
//! - [`types`]: Colours, button symbols, input snapshots

pub mod actuator;
pub mod discovery;
pub mod input;
pub mod types;
