//! ToyActuator trait definition

use crate::core::types::Rgb;
use crate::error::Result;

/// Command/query surface of a connected toy.
///
/// Every call may fail with a transport error. Calls are synchronous; the
/// control loop blocks on them for as long as the backend takes.
pub trait ToyActuator {
    /// Toy name as reported by discovery
    fn name(&self) -> &str;

    /// Face `degrees` (0-360, clockwise from the calibrated zero)
    fn set_heading(&mut self, degrees: f32) -> Result<()>;

    /// Roll at `magnitude` (0-255, 0 = stop)
    fn set_speed(&mut self, magnitude: u8) -> Result<()>;

    /// Set the front LED colour
    fn set_front_led(&mut self, color: Rgb) -> Result<()>;

    /// Show a single character on the display matrix
    fn set_display_glyph(&mut self, glyph: char, color: Rgb) -> Result<()>;

    /// Heading the toy currently reports, in degrees
    fn heading(&mut self) -> Result<f32>;

    /// Battery voltage from the power subsystem
    fn battery_voltage(&mut self) -> Result<f32>;

    /// Close the command session
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
