//! Stick-to-motion mapping and heading drift correction

use crate::config::ControlConfig;
use crate::core::types::InputSnapshot;

/// Normalize degrees into [0, 360)
pub fn normalize_heading(degrees: f32) -> f32 {
    let h = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if h >= 360.0 { 0.0 } else { h }
}

/// Shortest signed angle from `reference` to `actual`, in [-180, 180)
pub fn heading_error(actual: f32, reference: f32) -> f32 {
    let diff = normalize_heading(actual - reference);
    if diff >= 180.0 { diff - 360.0 } else { diff }
}

/// Command issued to the toy for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Roll toward `heading`
    Move { heading: f32, speed: u8 },
    /// Pivot in place to face `heading`
    Turn { heading: f32 },
    /// Sticks centered: stop
    Stop,
}

impl MotionCommand {
    /// Heading and speed sent to the toy (heading normalized)
    pub fn target(&self) -> (Option<f32>, u8) {
        match *self {
            MotionCommand::Move { heading, speed } => (Some(normalize_heading(heading)), speed),
            MotionCommand::Turn { heading } => (Some(normalize_heading(heading)), 0),
            MotionCommand::Stop => (None, 0),
        }
    }
}

/// Stick geometry thresholds
#[derive(Debug, Clone, Copy)]
pub struct MotionMapper {
    deadzone: f32,
    straight_deadzone: f32,
    turn_angle: f32,
}

impl MotionMapper {
    pub fn new(deadzone: f32, straight_deadzone: f32, turn_angle: f32) -> Self {
        Self {
            deadzone,
            straight_deadzone,
            turn_angle,
        }
    }

    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.deadzone, config.straight_deadzone, config.turn_angle)
    }

    /// Map the sticks to a command.
    ///
    /// Forward/back wins over left/right. Negative y is forward. Turns are
    /// stationary pivots of `turn_angle` off the reference.
    pub fn map(&self, input: &InputSnapshot, base_heading: f32, speed: u8) -> MotionCommand {
        if input.y.abs() > self.deadzone {
            let heading = if input.y < 0.0 {
                base_heading
            } else {
                base_heading + 180.0
            };
            MotionCommand::Move { heading, speed }
        } else if input.x.abs() > self.deadzone {
            let offset = if input.x > 0.0 {
                self.turn_angle
            } else {
                -self.turn_angle
            };
            MotionCommand::Turn {
                heading: base_heading + offset,
            }
        } else {
            MotionCommand::Stop
        }
    }

    /// Driving roughly straight: forward/back past the deadzone, lateral
    /// axis inside the tight deadzone
    pub fn is_straight(&self, input: &InputSnapshot) -> bool {
        input.y.abs() > self.deadzone && input.x.abs() < self.straight_deadzone
    }
}

/// Single-step proportional heading correction.
///
/// Returns the amount to add to the reference when the error exceeds
/// `threshold`, i.e. `-gain * error`. Applied once per tick, so drift is
/// pulled in gradually instead of snapping.
#[derive(Debug, Clone, Copy)]
pub struct HeadingCorrector {
    gain: f32,
    threshold: f32,
}

impl HeadingCorrector {
    pub fn new(gain: f32, threshold: f32) -> Self {
        Self { gain, threshold }
    }

    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.correction_gain, config.correction_threshold)
    }

    pub fn correction(&self, actual: f32, base_heading: f32) -> Option<f32> {
        let error = heading_error(actual, base_heading);
        if error.abs() > self.threshold {
            Some(-error * self.gain)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ButtonSet;
    use approx::assert_relative_eq;

    fn sticks(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::new(x, y, ButtonSet::empty())
    }

    fn mapper() -> MotionMapper {
        MotionMapper::from_config(&ControlConfig::default())
    }

    #[test]
    fn test_forward_and_reverse() {
        let m = mapper();
        assert_eq!(
            m.map(&sticks(0.0, -1.0), 90.0, 70),
            MotionCommand::Move {
                heading: 90.0,
                speed: 70
            }
        );
        let reverse = m.map(&sticks(0.0, 1.0), 90.0, 70);
        assert_eq!(reverse.target(), (Some(270.0), 70));
    }

    #[test]
    fn test_turns_are_pivots() {
        let m = mapper();
        let left = m.map(&sticks(-1.0, 0.0), 90.0, 200);
        assert_eq!(left.target(), (Some(68.0), 0));
        let right = m.map(&sticks(1.0, 0.0), 90.0, 200);
        assert_eq!(right.target(), (Some(112.0), 0));
        // left turn from 0 wraps
        let wrap = m.map(&sticks(-1.0, 0.0), 0.0, 50);
        assert_eq!(wrap.target(), (Some(338.0), 0));
    }

    #[test]
    fn test_forward_beats_turn_and_deadman() {
        let m = mapper();
        assert!(matches!(
            m.map(&sticks(0.9, -0.9), 0.0, 50),
            MotionCommand::Move { .. }
        ));
        assert_eq!(m.map(&sticks(0.7, -0.7), 0.0, 50), MotionCommand::Stop);
        assert_eq!(m.map(&sticks(0.0, 0.0), 0.0, 50).target(), (None, 0));
    }

    #[test]
    fn test_is_straight() {
        let m = mapper();
        assert!(m.is_straight(&sticks(0.1, -1.0)));
        assert!(!m.is_straight(&sticks(0.2, -1.0)));
        assert!(!m.is_straight(&sticks(0.0, -0.5)));
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(0.0), 0.0);
        assert_eq!(normalize_heading(360.0), 0.0);
        assert_eq!(normalize_heading(-2.0), 358.0);
        assert_eq!(normalize_heading(725.0), 5.0);
        let tiny = normalize_heading(-1e-6);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_heading_error_takes_short_way() {
        assert_relative_eq!(heading_error(10.0, 0.0), 10.0);
        assert_relative_eq!(heading_error(350.0, 0.0), -10.0);
        assert_relative_eq!(heading_error(5.0, 355.0), 10.0);
        assert_relative_eq!(heading_error(180.0, 0.0), -180.0);
    }

    #[test]
    fn test_correction_is_a_partial_step() {
        let corrector = HeadingCorrector::from_config(&ControlConfig::default());
        let c = corrector.correction(10.0, 0.0).unwrap();
        assert_relative_eq!(c, -2.0);
        assert_eq!(normalize_heading(0.0 + c), 358.0);

        assert_eq!(corrector.correction(3.0, 0.0), None);
        assert_eq!(corrector.correction(357.0, 0.0), None);
        assert!(corrector.correction(356.0, 0.0).unwrap() > 0.0);
    }
}
