//! Battery monitor: periodic voltage check shown on the front LED

use crate::config::BatteryConfig;
use crate::control::session::ControllerSession;
use crate::control::settle;
use crate::core::actuator::ToyActuator;
use crate::core::types::Rgb;
use crate::error::Error;
use std::time::{Duration, Instant};

/// Map a voltage to a traffic-light colour.
///
/// Bands are applied in order, each lower threshold overriding the previous
/// colour, so the result is the worst band the voltage falls into:
///
/// | Voltage | Colour |
/// |---------|--------|
/// | >= green | green |
/// | [yellow, green) | yellow |
/// | [orange, yellow) | orange |
/// | < orange | red |
pub fn battery_color(voltage: f32, config: &BatteryConfig) -> Rgb {
    let mut color = Rgb::GREEN;
    if voltage < config.green_volts {
        color = Rgb::YELLOW;
    }
    if voltage < config.yellow_volts {
        color = Rgb::ORANGE;
    }
    if voltage < config.orange_volts {
        color = Rgb::RED;
    }
    color
}

#[derive(Debug, Clone)]
pub struct BatteryMonitor {
    config: BatteryConfig,
    interval: Duration,
    last_check: Instant,
}

impl BatteryMonitor {
    /// First check happens one interval after `start`
    pub fn new(config: BatteryConfig, start: Instant) -> Self {
        let interval = config.check_interval();
        Self {
            config,
            interval,
            last_check: start,
        }
    }

    pub fn last_check(&self) -> Instant {
        self.last_check
    }

    /// Check the battery if the interval has elapsed.
    ///
    /// Returns the colour shown, or `None` if no check was due or the read
    /// failed. A failed read leaves the LED untouched; the timestamp still
    /// advances so a flaky link is not queried every tick.
    pub fn maybe_check(
        &mut self,
        now: Instant,
        session: &mut ControllerSession,
        toy: &mut dyn ToyActuator,
    ) -> Option<Rgb> {
        if now.saturating_duration_since(self.last_check) < self.interval {
            return None;
        }
        self.last_check = now;

        let reading = toy.battery_voltage().and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(Error::actuator("battery_voltage", format!("invalid reading {}", v)))
            }
        });
        let voltage = match settle(session, reading) {
            Some(v) => v,
            None => {
                log::warn!("Player {}: battery check failed", session.player_id());
                return None;
            }
        };

        log::info!("Player {} battery: {:.2} V", session.player_id(), voltage);
        let color = battery_color(voltage, &self.config);
        let result = toy.set_front_led(color);
        settle(session, result).map(|_| color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::{MockToy, ToyCall};

    #[test]
    fn test_band_boundaries() {
        let config = BatteryConfig::default();
        assert_eq!(battery_color(4.2, &config), Rgb::GREEN);
        assert_eq!(battery_color(4.1, &config), Rgb::GREEN);
        assert_eq!(battery_color(4.099, &config), Rgb::YELLOW);
        assert_eq!(battery_color(3.9, &config), Rgb::YELLOW);
        assert_eq!(battery_color(3.899, &config), Rgb::ORANGE);
        assert_eq!(battery_color(3.7, &config), Rgb::ORANGE);
        assert_eq!(battery_color(3.699, &config), Rgb::RED);
        assert_eq!(battery_color(0.0, &config), Rgb::RED);
    }

    #[test]
    fn test_band_sweep() {
        let config = BatteryConfig::default();
        for millivolts in 3000..4500 {
            let v = millivolts as f32 / 1000.0;
            let expected = if v >= 4.1 {
                Rgb::GREEN
            } else if v >= 3.9 {
                Rgb::YELLOW
            } else if v >= 3.7 {
                Rgb::ORANGE
            } else {
                Rgb::RED
            };
            assert_eq!(battery_color(v, &config), expected, "at {} V", v);
        }
    }

    #[test]
    fn test_interval_gates_checks() {
        let start = Instant::now();
        let mut session = ControllerSession::new(2, 50, start);
        let mut toy = MockToy::new("SB-TEST");
        toy.set_voltage(3.8);
        let mut monitor = BatteryMonitor::new(BatteryConfig::default(), start);

        assert_eq!(
            monitor.maybe_check(start + Duration::from_secs(29), &mut session, &mut toy),
            None
        );
        assert!(toy.calls().is_empty());

        let due = start + Duration::from_secs(30);
        assert_eq!(
            monitor.maybe_check(due, &mut session, &mut toy),
            Some(Rgb::ORANGE)
        );
        assert_eq!(monitor.last_check(), due);
        assert_eq!(
            toy.calls(),
            vec![ToyCall::ReadBattery, ToyCall::SetFrontLed(Rgb::ORANGE)]
        );
    }

    #[test]
    fn test_failed_read_keeps_led() {
        let start = Instant::now();
        let mut session = ControllerSession::new(1, 50, start);
        let mut toy = MockToy::new("SB-TEST");
        toy.fail("battery_voltage");
        let mut monitor = BatteryMonitor::new(BatteryConfig::default(), start);

        let due = start + Duration::from_secs(31);
        assert_eq!(monitor.maybe_check(due, &mut session, &mut toy), None);
        assert_eq!(toy.last_led(), None);
        assert_eq!(monitor.last_check(), due);
        assert!(session.is_running());
    }
}
