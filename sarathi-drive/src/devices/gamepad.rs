//! Physical controller via gilrs
//!
//! Pad indices are positions in the tables below; `[buttons]` in the config
//! maps symbols onto them. Stick Y axes are negated so pushing forward reads
//! negative, matching the control loop's convention.

use crate::core::input::InputSource;
use crate::error::{Error, Result};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};

/// Axis index -> gilrs axis (and whether to negate)
const AXES: [(Axis, bool); 6] = [
    (Axis::LeftStickX, false),
    (Axis::LeftStickY, true),
    (Axis::RightStickX, false),
    (Axis::RightStickY, true),
    (Axis::LeftZ, false),
    (Axis::RightZ, false),
];

/// Button index -> gilrs button
const BUTTONS: [Button; 16] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::LeftThumb,
    Button::RightThumb,
];

pub struct GamepadInput {
    gilrs: Gilrs,
    id: GamepadId,
}

impl GamepadInput {
    /// Open the `index`-th connected controller
    pub fn open(index: usize) -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| Error::InputUnavailable(e.to_string()))?;

        let count = gilrs.gamepads().count();
        let Some((id, pad)) = gilrs.gamepads().nth(index) else {
            return Err(Error::InputUnavailable(format!(
                "controller {} not found ({} connected)",
                index, count
            )));
        };
        log::info!("Controller {}: {}", index, pad.name());

        Ok(Self { gilrs, id })
    }
}

impl InputSource for GamepadInput {
    fn poll_events(&mut self) -> Result<()> {
        while let Some(event) = self.gilrs.next_event() {
            if event.id == self.id && event.event == EventType::Disconnected {
                return Err(Error::InputUnavailable("controller disconnected".to_string()));
            }
        }
        Ok(())
    }

    fn axis(&self, index: usize) -> f32 {
        let Some(&(axis, negate)) = AXES.get(index) else {
            return 0.0;
        };
        let value = self.gilrs.gamepad(self.id).value(axis);
        if negate { -value } else { value }
    }

    fn button_pressed(&self, index: usize) -> bool {
        BUTTONS
            .get(index)
            .is_some_and(|b| self.gilrs.gamepad(self.id).is_pressed(*b))
    }
}
