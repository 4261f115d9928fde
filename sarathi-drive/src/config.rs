//! Configuration for SarathiDrive
//!
//! Every value has a default, so the configuration file is optional. When
//! `sarathi.toml` exists in the working directory it is loaded; missing
//! sections and keys fall back to the defaults below.
//!
//! ```toml
//! [control]
//! tick_ms = 20
//! deadzone = 0.7
//! sequence_input = "level"   # or "edge"
//!
//! [battery]
//! check_interval_secs = 30
//!
//! [buttons]
//! calibrate = "L1"
//! UP = 10
//!
//! [sequence]
//! target = ["UP", "UP", "DOWN", "DOWN", "LEFT", "RIGHT", "LEFT", "RIGHT", "B", "A"]
//!
//! [[sim.toys]]
//! name = "SB-1A2B"
//! rssi = -48
//! ```

use crate::core::types::Button;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "sarathi.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub control: ControlConfig,
    pub battery: BatteryConfig,
    pub buttons: ButtonMap,
    pub sequence: SequenceConfig,
    pub sim: SimConfig,
}

/// How the sequence detector is fed each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceInput {
    /// Every held symbol, every tick
    #[default]
    Level,
    /// Only symbols pressed since the previous tick
    Edge,
}

/// Control loop tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Tick period in milliseconds
    pub tick_ms: u64,
    /// Axis magnitude below which a stick counts as centered
    pub deadzone: f32,
    /// Lateral magnitude below which driving counts as straight
    pub straight_deadzone: f32,
    /// Pivot angle for a left/right turn (degrees)
    pub turn_angle: f32,
    /// Heading trim per tick while aiming (degrees)
    pub heading_adjustment: f32,
    /// Speed pinned by cheat mode
    pub max_speed: u8,
    /// Speed before any preset is chosen
    pub initial_speed: u8,
    /// Fraction of the heading error fed back per tick
    pub correction_gain: f32,
    /// Heading error (degrees) below which no correction is applied
    pub correction_threshold: f32,
    /// Sequence detector feed policy
    pub sequence_input: SequenceInput,
}

impl ControlConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            deadzone: 0.7,
            straight_deadzone: 0.2,
            turn_angle: 22.0,
            heading_adjustment: 5.0,
            max_speed: 255,
            initial_speed: 50,
            correction_gain: 0.2,
            correction_threshold: 3.0,
            sequence_input: SequenceInput::Level,
        }
    }
}

/// Battery monitor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Seconds between voltage checks
    pub check_interval_secs: u64,
    /// At or above: green
    pub green_volts: f32,
    /// At or above (and below green): yellow
    pub yellow_volts: f32,
    /// At or above (and below yellow): orange; below: red
    pub orange_volts: f32,
}

impl BatteryConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            green_volts: 4.1,
            yellow_volts: 3.9,
            orange_volts: 3.7,
        }
    }
}

/// Pad layout: raw controller index per symbol, plus axis indices
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ButtonMap {
    #[serde(rename = "1")]
    pub one: usize,
    #[serde(rename = "2")]
    pub two: usize,
    #[serde(rename = "3")]
    pub three: usize,
    #[serde(rename = "4")]
    pub four: usize,
    #[serde(rename = "L1")]
    pub l1: usize,
    #[serde(rename = "R1")]
    pub r1: usize,
    #[serde(rename = "L2")]
    pub l2: usize,
    #[serde(rename = "R2")]
    pub r2: usize,
    #[serde(rename = "SELECT")]
    pub select: usize,
    #[serde(rename = "START")]
    pub start: usize,
    #[serde(rename = "UP")]
    pub up: usize,
    #[serde(rename = "DOWN")]
    pub down: usize,
    #[serde(rename = "LEFT")]
    pub left: usize,
    #[serde(rename = "RIGHT")]
    pub right: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "A")]
    pub a: usize,
    /// Symbol that enters calibration while held
    pub calibrate: Button,
    /// Left/right axis index
    pub x_axis: usize,
    /// Forward/back axis index
    pub y_axis: usize,
}

impl ButtonMap {
    /// Raw pad index for a symbol
    pub fn index(&self, button: Button) -> usize {
        match button {
            Button::One => self.one,
            Button::Two => self.two,
            Button::Three => self.three,
            Button::Four => self.four,
            Button::L1 => self.l1,
            Button::R1 => self.r1,
            Button::L2 => self.l2,
            Button::R2 => self.r2,
            Button::Select => self.select,
            Button::Start => self.start,
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Left => self.left,
            Button::Right => self.right,
            Button::B => self.b,
            Button::A => self.a,
        }
    }
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            one: 0,
            two: 1,
            three: 2,
            four: 3,
            l1: 4,
            r1: 5,
            l2: 6,
            r2: 7,
            select: 8,
            start: 9,
            up: 10,
            down: 11,
            left: 12,
            right: 13,
            b: 14,
            a: 15,
            calibrate: Button::L1,
            x_axis: 0,
            y_axis: 1,
        }
    }
}

/// Secret sequence that unlocks cheat mode
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub target: Vec<Button>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            target: vec![
                Button::Up,
                Button::Up,
                Button::Down,
                Button::Down,
                Button::Left,
                Button::Right,
                Button::Left,
                Button::Right,
                Button::B,
                Button::A,
            ],
        }
    }
}

/// A simulated toy visible to discovery
#[derive(Debug, Clone, Deserialize)]
pub struct SimToyConfig {
    pub name: String,
    #[serde(default = "default_rssi")]
    pub rssi: i16,
}

fn default_rssi() -> i16 {
    -60
}

/// Simulated backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Toys the simulated scanner reports
    pub toys: Vec<SimToyConfig>,
    /// Heading drift while rolling at full speed (degrees/second)
    pub heading_drift_deg_per_s: f32,
    /// Time constant of the toy's own heading hold (seconds)
    pub heading_hold_secs: f32,
    /// Voltage at connect
    pub battery_start_volts: f32,
    /// Linear drain (volts/minute)
    pub battery_drain_volts_per_min: f32,
    /// Probability that any single command fails (0.0-1.0)
    pub fault_rate: f32,
    /// Noise seed, 0 = random each run
    pub random_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            toys: vec![
                SimToyConfig {
                    name: "SB-1A2B".to_string(),
                    rssi: -48,
                },
                SimToyConfig {
                    name: "SB-3C4D".to_string(),
                    rssi: -71,
                },
            ],
            heading_drift_deg_per_s: 6.0,
            heading_hold_secs: 2.0,
            battery_start_volts: 4.2,
            battery_drain_volts_per_min: 0.02,
            fault_rate: 0.0,
            random_seed: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.control.tick_ms == 0 {
            return Err(Error::Config(
                "control.tick_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            log::info!("Using default configuration");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.control.tick_period(), Duration::from_millis(20));
        assert_eq!(config.control.deadzone, 0.7);
        assert_eq!(config.control.max_speed, 255);
        assert_eq!(config.battery.check_interval(), Duration::from_secs(30));
        assert_eq!(config.buttons.index(Button::Up), 10);
        assert_eq!(config.buttons.index(Button::A), 15);
        assert_eq!(config.sequence.target.len(), 10);
        assert_eq!(config.control.sequence_input, SequenceInput::Level);
    }

    #[test]
    fn test_toml_partial_override() {
        let toml_content = r#"
[control]
tick_ms = 10
sequence_input = "edge"

[buttons]
calibrate = "SELECT"
UP = 3

[[sim.toys]]
name = "SB-FFFF"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.control.tick_ms, 10);
        assert_eq!(config.control.deadzone, 0.7);
        assert_eq!(config.control.sequence_input, SequenceInput::Edge);
        assert_eq!(config.buttons.calibrate, Button::Select);
        assert_eq!(config.buttons.index(Button::Up), 3);
        assert_eq!(config.buttons.index(Button::Down), 11);
        assert_eq!(config.sim.toys.len(), 1);
        assert_eq!(config.sim.toys[0].rssi, -60);
        assert_eq!(config.battery.green_volts, 4.1);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sequence.target, SequenceConfig::default().target);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_or_default("/nonexistent/sarathi.toml").unwrap();
        assert_eq!(config.control.turn_angle, 22.0);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config: Config = toml::from_str("[control]\ntick_ms = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(Config::default().validate().is_ok());

        let path = std::env::temp_dir().join(format!("sarathi-zero-tick-{}.toml", std::process::id()));
        fs::write(&path, "[control]\ntick_ms = 0\n").unwrap();
        let loaded = Config::load_or_default(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(loaded, Err(Error::Config(_))));
    }
}
