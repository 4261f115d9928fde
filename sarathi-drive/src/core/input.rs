//! InputSource trait definition

use crate::config::ButtonMap;
use crate::core::types::{Button, ButtonSet, InputSnapshot};
use crate::error::Result;

/// Controller abstraction (axes in [-1, 1], buttons by pad index)
pub trait InputSource {
    /// Pump the backend's event queue so axis/button reads are current
    fn poll_events(&mut self) -> Result<()>;

    /// Axis value in [-1, 1]; unknown indices read as 0
    fn axis(&self, index: usize) -> f32;

    /// Whether the button at `index` is held; unknown indices read as released
    fn button_pressed(&self, index: usize) -> bool;
}

/// Pump events and read one snapshot through the configured pad layout.
///
/// Axis readings are clamped to [-1, 1].
pub fn sample(input: &mut dyn InputSource, map: &ButtonMap) -> Result<InputSnapshot> {
    input.poll_events()?;

    let x = input.axis(map.x_axis).clamp(-1.0, 1.0);
    let y = input.axis(map.y_axis).clamp(-1.0, 1.0);
    let pressed: ButtonSet = Button::ALL
        .into_iter()
        .filter(|b| input.button_pressed(map.index(*b)))
        .collect();

    Ok(InputSnapshot::new(x, y, pressed))
}
