//! Calibration (aiming) sub-mode
//!
//! While aiming the toy stands still with its front LED red and the stick's
//! lateral axis trims the heading reference by a fixed step per tick. Leaving
//! calibration turns the LED green, normalizes the reference into [0, 360)
//! and starts the game clock.

use crate::config::ControlConfig;
use crate::control::motion::normalize_heading;
use crate::control::session::ControllerSession;
use crate::control::settle;
use crate::core::actuator::ToyActuator;
use crate::core::types::Rgb;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct CalibrationState {
    /// Degrees per trim step
    adjustment: f32,
    /// Lateral axis magnitude needed to trim
    deadzone: f32,
}

impl CalibrationState {
    pub fn new(adjustment: f32, deadzone: f32) -> Self {
        Self {
            adjustment,
            deadzone,
        }
    }

    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.heading_adjustment, config.deadzone)
    }

    /// Enter calibration if not calibrating, exit otherwise
    pub fn toggle(
        &self,
        session: &mut ControllerSession,
        toy: &mut dyn ToyActuator,
        x_axis: f32,
        now: Instant,
    ) {
        if session.is_calibrating() {
            self.exit(session, toy, now);
        } else {
            self.enter(session, toy, x_axis);
        }
    }

    fn enter(&self, session: &mut ControllerSession, toy: &mut dyn ToyActuator, x_axis: f32) {
        session.enter_calibration();
        self.trim(session, toy, x_axis);
        log::info!(
            "Player {}: calibrating, base heading = {:.1}",
            session.player_id(),
            session.base_heading()
        );
    }

    /// One aiming step: hold still, show red, nudge the reference, face it.
    ///
    /// The LED is re-sent every step so a battery colour shown mid-aim does
    /// not linger. Stops early once a call has ended the session.
    pub fn trim(&self, session: &mut ControllerSession, toy: &mut dyn ToyActuator, x_axis: f32) {
        let result = toy.set_speed(0);
        settle(session, result);
        if !session.is_running() {
            return;
        }

        let result = toy.set_front_led(Rgb::RED);
        settle(session, result);
        if !session.is_running() {
            return;
        }

        if x_axis < -self.deadzone {
            session.nudge_base_heading(-self.adjustment);
        } else if x_axis > self.deadzone {
            session.nudge_base_heading(self.adjustment);
        }

        let result = toy.set_heading(normalize_heading(session.base_heading()));
        settle(session, result);
        log::trace!("Calibration trim: base heading = {:.1}", session.base_heading());
    }

    fn exit(&self, session: &mut ControllerSession, toy: &mut dyn ToyActuator, now: Instant) {
        let result = toy.set_front_led(Rgb::GREEN);
        settle(session, result);
        session.exit_calibration(now);
        log::info!(
            "Player {}: calibration complete, base heading = {:.1}",
            session.player_id(),
            session.base_heading()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Phase;
    use crate::devices::mock::{MockToy, ToyCall};

    fn setup() -> (CalibrationState, ControllerSession, MockToy) {
        (
            CalibrationState::new(5.0, 0.7),
            ControllerSession::new(1, 50, Instant::now()),
            MockToy::new("SB-TEST"),
        )
    }

    #[test]
    fn test_enter_stops_and_turns_red() {
        let (calibration, mut session, mut toy) = setup();
        calibration.toggle(&mut session, &mut toy, 1.0, Instant::now());

        assert!(session.is_calibrating());
        assert_eq!(session.phase(), Phase::Calibrating);
        assert_eq!(session.base_heading(), 5.0);
        assert_eq!(
            toy.calls(),
            vec![
                ToyCall::SetSpeed(0),
                ToyCall::SetFrontLed(Rgb::RED),
                ToyCall::SetHeading(5.0),
            ]
        );
    }

    #[test]
    fn test_every_trim_reasserts_red() {
        let (calibration, mut session, mut toy) = setup();
        calibration.toggle(&mut session, &mut toy, 0.0, Instant::now());
        toy.set_front_led(Rgb::YELLOW).unwrap();

        calibration.trim(&mut session, &mut toy, 0.0);
        assert_eq!(toy.last_led(), Some(Rgb::RED));
        assert!(session.is_calibrating());
    }

    #[test]
    fn test_lost_link_cuts_trim_short() {
        let (calibration, mut session, mut toy) = setup();
        toy.disconnect();
        calibration.toggle(&mut session, &mut toy, 1.0, Instant::now());
        assert!(!session.is_running());
        assert_eq!(toy.calls(), vec![ToyCall::SetSpeed(0)]);
    }

    #[test]
    fn test_deadzone_blocks_trim() {
        let (calibration, mut session, mut toy) = setup();
        calibration.toggle(&mut session, &mut toy, 0.7, Instant::now());
        calibration.trim(&mut session, &mut toy, -0.69);
        assert_eq!(session.base_heading(), 0.0);
    }

    #[test]
    fn test_exit_normalizes_negative_reference() {
        let (calibration, mut session, mut toy) = setup();
        calibration.toggle(&mut session, &mut toy, -1.0, Instant::now());
        for _ in 0..9 {
            calibration.trim(&mut session, &mut toy, -1.0);
        }
        assert_eq!(session.base_heading(), -50.0);
        // the toy is always sent a normalized heading
        assert_eq!(toy.last_heading_command(), Some(310.0));

        toy.clear_calls();
        calibration.toggle(&mut session, &mut toy, 0.0, Instant::now());
        assert!(!session.is_calibrating());
        assert_eq!(session.base_heading(), 310.0);
        assert_eq!(toy.calls(), vec![ToyCall::SetFrontLed(Rgb::GREEN)]);
        assert_eq!(session.phase(), Phase::Driving);
    }

    #[test]
    fn test_exit_normalizes_over_full_turn() {
        let (calibration, mut session, mut toy) = setup();
        session.set_base_heading(355.0);
        calibration.toggle(&mut session, &mut toy, 1.0, Instant::now());
        calibration.trim(&mut session, &mut toy, 1.0);
        assert_eq!(session.base_heading(), 365.0);

        calibration.toggle(&mut session, &mut toy, 0.0, Instant::now());
        assert_eq!(session.base_heading(), 5.0);
    }

    #[test]
    fn test_led_failure_is_not_fatal() {
        let (calibration, mut session, mut toy) = setup();
        toy.fail("set_front_led");
        calibration.toggle(&mut session, &mut toy, 1.0, Instant::now());
        assert!(session.is_calibrating());
        assert!(session.is_running());
        assert_eq!(toy.last_heading_command(), Some(5.0));
    }
}
