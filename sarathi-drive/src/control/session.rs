//! Per-robot session state
//!
//! The control loop is the only mutator. Flags that must not be flipped
//! back (cheat mode) have no setter in the reverse direction.

use crate::control::motion::normalize_heading;
use crate::core::types::{Button, Phase, Rgb};
use std::time::Instant;

/// Speed/colour pairing bound to one button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub button: Button,
    pub speed: u8,
    pub color: Rgb,
}

/// Presets in priority order (first pressed wins)
pub const PRESETS: [Preset; 4] = [
    Preset {
        button: Button::One,
        speed: 50,
        color: Rgb::new(255, 200, 0),
    },
    Preset {
        button: Button::Two,
        speed: 70,
        color: Rgb::new(255, 100, 0),
    },
    Preset {
        button: Button::Three,
        speed: 100,
        color: Rgb::new(255, 50, 0),
    },
    Preset {
        button: Button::Four,
        speed: 200,
        color: Rgb::new(255, 0, 0),
    },
];

/// Display glyph for a player id; unknown ids show '?'
pub fn player_glyph(player_id: u8) -> char {
    match player_id {
        1..=5 => char::from(b'0' + player_id),
        _ => '?',
    }
}

/// State of one robot/controller pairing
#[derive(Debug, Clone)]
pub struct ControllerSession {
    speed: u8,
    base_heading: f32,
    color: Rgb,
    player_id: u8,
    running: bool,
    calibrating: bool,
    cheat_mode: bool,
    phase: Phase,
    game_start: Instant,
}

impl ControllerSession {
    /// New session: heading reference 0, identity colour red
    pub fn new(player_id: u8, initial_speed: u8, now: Instant) -> Self {
        Self {
            speed: initial_speed,
            base_heading: 0.0,
            color: Rgb::RED,
            player_id,
            running: true,
            calibrating: false,
            cheat_mode: false,
            phase: Phase::Idle,
            game_start: now,
        }
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Calibrated "forward" reference in degrees
    pub fn base_heading(&self) -> f32 {
        self.base_heading
    }

    /// Identity/status colour (tints the player glyph)
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn player_id(&self) -> u8 {
        self.player_id
    }

    pub fn glyph(&self) -> char {
        player_glyph(self.player_id)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn cheat_mode(&self) -> bool {
        self.cheat_mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set when calibration was last completed (or session creation)
    pub fn game_start(&self) -> Instant {
        self.game_start
    }

    /// Replace the heading reference (normalized into [0, 360))
    pub fn set_base_heading(&mut self, degrees: f32) {
        self.base_heading = normalize_heading(degrees);
    }

    /// Apply a preset. Ignored once cheat mode is on; returns whether it took.
    pub fn apply_preset(&mut self, preset: &Preset) -> bool {
        if self.cheat_mode {
            return false;
        }
        self.speed = preset.speed;
        self.color = preset.color;
        true
    }

    /// Latch cheat mode and pin speed. Returns true on the first activation.
    pub fn activate_cheat_mode(&mut self, max_speed: u8) -> bool {
        let first = !self.cheat_mode;
        self.cheat_mode = true;
        self.speed = max_speed;
        first
    }

    /// Add a proportional heading correction; the reference stays in [0, 360)
    pub fn apply_heading_correction(&mut self, correction: f32) {
        self.base_heading = normalize_heading(self.base_heading + correction);
    }

    pub(crate) fn enter_calibration(&mut self) {
        self.calibrating = true;
        self.phase = Phase::Calibrating;
    }

    /// Trim the reference while aiming; may leave [0, 360) until exit
    pub(crate) fn nudge_base_heading(&mut self, delta: f32) {
        self.base_heading += delta;
    }

    pub(crate) fn exit_calibration(&mut self, now: Instant) {
        self.calibrating = false;
        self.base_heading = normalize_heading(self.base_heading);
        self.phase = Phase::Driving;
        self.game_start = now;
    }

    /// Ask the loop to finish at the next tick boundary
    pub fn stop(&mut self) {
        self.running = false;
    }
}
