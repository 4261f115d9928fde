//! Simulated toy backend for hardware-free driving
//!
//! Stands in for the radio link so the whole loop (discovery, connect,
//! control, teardown) can run on a desk without a robot.
//!
//! # Model
//!
//! | Quantity | Simulation |
//! |----------|------------|
//! | Discovery | Fixed toy list from `[sim]`, strongest RSSI is nearest |
//! | Heading | Commanded heading plus a veer that builds while rolling |
//! | Battery | Linear drain from the start voltage, small jitter |
//! | Link faults | Each command fails with probability `fault_rate` |
//!
//! The veer grows at `heading_drift_deg_per_s` (scaled by speed) and
//! relaxes with time constant `heading_hold_secs`, so at full speed it
//! settles near `drift * hold` degrees off the commanded heading.
//!
//! # Configuration
//!
//! ```toml
//! [sim]
//! toys = [{ name = "SB-1A2B", rssi = -48 }]
//! heading_drift_deg_per_s = 6.0
//! heading_hold_secs = 2.0
//! fault_rate = 0.01
//! random_seed = 42      # 0 = random each run
//! ```

mod noise;

pub use noise::SimNoise;

use crate::config::SimConfig;
use crate::control::motion::normalize_heading;
use crate::core::actuator::ToyActuator;
use crate::core::discovery::{Scanner, ToyHandle};
use crate::core::types::Rgb;
use crate::error::{Error, Result};
use std::time::Instant;

/// Flat battery floor
const MIN_VOLTS: f32 = 3.0;

/// Discovery over the configured simulated toys
pub struct SimScanner {
    config: SimConfig,
    connections: u64,
}

impl SimScanner {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            connections: 0,
        }
    }

    fn handles(&self) -> impl Iterator<Item = ToyHandle> + '_ {
        self.config
            .toys
            .iter()
            .map(|t| ToyHandle::new(t.name.clone(), t.rssi))
    }
}

impl Scanner for SimScanner {
    fn find_by_name(&mut self, name: &str) -> Result<ToyHandle> {
        log::info!("Scanning for '{}'...", name);
        self.handles()
            .find(|h| h.name == name)
            .ok_or_else(|| Error::ToyNotFound(name.to_string()))
    }

    fn find_nearest(&mut self) -> Result<ToyHandle> {
        log::info!("Scanning for the nearest toy...");
        self.handles()
            .max_by_key(|h| h.rssi)
            .ok_or(Error::NoToysFound)
    }

    fn connect(&mut self, handle: &ToyHandle) -> Result<Box<dyn ToyActuator>> {
        // Distinct noise stream per connection, still reproducible
        let seed = match self.config.random_seed {
            0 => 0,
            seed => seed.wrapping_add(self.connections),
        };
        self.connections += 1;

        log::info!("Connected to '{}' ({} dBm)", handle.name, handle.rssi);
        Ok(Box::new(SimToy::new(
            handle.name.clone(),
            &self.config,
            seed,
            Instant::now(),
        )))
    }
}

/// A simulated toy
pub struct SimToy {
    name: String,
    drift_rate: f32,
    hold_secs: f32,
    start_volts: f32,
    drain_per_sec: f32,
    fault_rate: f32,
    noise: SimNoise,

    commanded_heading: f32,
    veer: f32,
    speed: u8,
    front_led: Rgb,
    glyph: Option<(char, Rgb)>,
    released: bool,

    connected_at: Instant,
    clock: Instant,
}

impl SimToy {
    pub fn new(name: String, config: &SimConfig, seed: u64, now: Instant) -> Self {
        Self {
            name,
            drift_rate: config.heading_drift_deg_per_s,
            hold_secs: config.heading_hold_secs,
            start_volts: config.battery_start_volts,
            drain_per_sec: config.battery_drain_volts_per_min / 60.0,
            fault_rate: config.fault_rate,
            noise: SimNoise::new(seed),
            commanded_heading: 0.0,
            veer: 0.0,
            speed: 0,
            front_led: Rgb::default(),
            glyph: None,
            released: false,
            connected_at: now,
            clock: now,
        }
    }

    /// Integrate the heading model up to `now`. Earlier instants are ignored.
    pub fn advance_to(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.clock).as_secs_f32();
        if dt <= 0.0 {
            return;
        }
        self.clock = now;

        let throttle = self.speed as f32 / 255.0;
        self.veer += self.drift_rate * throttle * dt;
        if self.hold_secs > 0.0 {
            self.veer *= (-dt / self.hold_secs).exp();
        }
    }

    /// Current offset between actual and commanded heading
    pub fn veer(&self) -> f32 {
        self.veer
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn front_led(&self) -> Rgb {
        self.front_led
    }

    pub fn glyph(&self) -> Option<(char, Rgb)> {
        self.glyph
    }

    /// Voltage at `now`, without sensor jitter
    pub fn voltage_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.connected_at).as_secs_f32();
        (self.start_volts - self.drain_per_sec * elapsed).max(MIN_VOLTS)
    }

    fn link(&mut self, op: &'static str) -> Result<()> {
        if self.released {
            return Err(Error::Disconnected(self.name.clone()));
        }
        if self.noise.packet_lost(self.fault_rate) {
            log::trace!("{}: dropped '{}'", self.name, op);
            return Err(Error::actuator(op, "simulated packet loss"));
        }
        self.advance_to(Instant::now());
        Ok(())
    }
}

impl ToyActuator for SimToy {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_heading(&mut self, degrees: f32) -> Result<()> {
        self.link("set_heading")?;
        self.commanded_heading = normalize_heading(degrees);
        Ok(())
    }

    fn set_speed(&mut self, magnitude: u8) -> Result<()> {
        self.link("set_speed")?;
        if magnitude != self.speed {
            log::trace!("{}: speed {} -> {}", self.name, self.speed, magnitude);
        }
        self.speed = magnitude;
        Ok(())
    }

    fn set_front_led(&mut self, color: Rgb) -> Result<()> {
        self.link("set_front_led")?;
        if color != self.front_led {
            log::debug!("{}: front LED {}", self.name, color);
        }
        self.front_led = color;
        Ok(())
    }

    fn set_display_glyph(&mut self, glyph: char, color: Rgb) -> Result<()> {
        self.link("set_display_glyph")?;
        self.glyph = Some((glyph, color));
        Ok(())
    }

    fn heading(&mut self) -> Result<f32> {
        self.link("heading")?;
        let reading = self.noise.compass(self.commanded_heading + self.veer);
        Ok(normalize_heading(reading))
    }

    fn battery_voltage(&mut self) -> Result<f32> {
        self.link("battery_voltage")?;
        let volts = self.voltage_at(self.clock);
        Ok(self.noise.voltmeter(volts))
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        log::info!("{}: session closed", self.name);
        Ok(())
    }
}
