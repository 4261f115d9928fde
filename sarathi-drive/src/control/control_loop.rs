//! The teleoperation control loop
//!
//! One loop per paired robot/controller. The loop exclusively owns its
//! session, toy handle and input handle; nothing is shared across loops.
//!
//! # Tick
//!
//! ```text
//! 1. sample input (axes + pressed set)
//! 2. battery check if the interval elapsed
//! 3. feed the sequence detector; completion latches cheat mode
//! 4. speed/colour presets (ignored in cheat mode)
//! 5. calibrate button held -> aim; else stick -> move / pivot / stop
//! 6. cheat mode + stick straight -> proportional heading correction
//!    (also while aiming)
//! 7. refresh the player glyph
//! ```
//!
//! Every toy call is isolated: a failing call is logged and the tick goes on
//! with the previous state. Fatal errors (link lost, controller gone) end the
//! session; the rest of that tick sends nothing further and the loop exits
//! at the tick boundary.

use crate::config::{ButtonMap, Config, ControlConfig, SequenceInput};
use crate::control::battery::BatteryMonitor;
use crate::control::calibration::CalibrationState;
use crate::control::motion::{HeadingCorrector, MotionCommand, MotionMapper, normalize_heading};
use crate::control::scheduler::TickScheduler;
use crate::control::sequence::SequenceDetector;
use crate::control::session::{ControllerSession, PRESETS};
use crate::control::settle;
use crate::core::actuator::ToyActuator;
use crate::core::input::{InputSource, sample};
use crate::core::types::{ButtonSet, InputSnapshot, Rgb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Front LED colour shown when cheat mode unlocks
pub const CHEAT_COLOR: Rgb = Rgb::PURPLE;

pub struct ControlLoop {
    control: ControlConfig,
    buttons: ButtonMap,
    session: ControllerSession,
    toy: Box<dyn ToyActuator>,
    input: Box<dyn InputSource>,
    detector: SequenceDetector,
    calibration: CalibrationState,
    battery: BatteryMonitor,
    mapper: MotionMapper,
    corrector: HeadingCorrector,
    /// Pressed set from the previous tick (edge detection)
    previous: ButtonSet,
    ticks: u64,
}

impl ControlLoop {
    /// Create a loop for a freshly connected toy
    pub fn new(
        config: &Config,
        player_id: u8,
        toy: Box<dyn ToyActuator>,
        input: Box<dyn InputSource>,
        now: Instant,
    ) -> Self {
        let control = config.control.clone();
        let session = ControllerSession::new(player_id, control.initial_speed, now);
        if session.glyph() == '?' {
            log::warn!("Player id {} has no glyph; showing '?'", player_id);
        }

        Self {
            calibration: CalibrationState::from_config(&control),
            mapper: MotionMapper::from_config(&control),
            corrector: HeadingCorrector::from_config(&control),
            detector: SequenceDetector::new(config.sequence.target.clone()),
            battery: BatteryMonitor::new(config.battery.clone(), now),
            buttons: config.buttons.clone(),
            control,
            session,
            toy,
            input,
            previous: ButtonSet::empty(),
            ticks: 0,
        }
    }

    pub fn session(&self) -> &ControllerSession {
        &self.session
    }

    /// Progress into the cheat sequence
    pub fn sequence_cursor(&self) -> usize {
        self.detector.cursor()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ask the loop to end at the next tick boundary
    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Run until the session stops or `running` is cleared, then tear down
    pub fn run(&mut self, running: &AtomicBool) {
        log::info!(
            "Player {}: driving '{}' (tick {}ms)",
            self.session.player_id(),
            self.toy.name(),
            self.control.tick_ms
        );

        self.show_glyph();
        let mut scheduler = TickScheduler::new(self.control.tick_period(), Instant::now());

        while self.session.is_running() && running.load(Ordering::Relaxed) {
            self.tick(Instant::now());
            scheduler.wait();
        }

        if scheduler.overruns() > 0 {
            log::debug!("{} of {} ticks overran", scheduler.overruns(), self.ticks);
        }
        self.shutdown();
    }

    /// Sample the controller and run one tick.
    ///
    /// A recoverable poll failure is treated as centered sticks with nothing
    /// pressed. A lost controller stops the toy and ends the session without
    /// running the rest of the tick.
    pub fn tick(&mut self, now: Instant) {
        let snapshot = match sample(self.input.as_mut(), &self.buttons) {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_fatal() => {
                log::error!("Player {}: {}; ending session", self.session.player_id(), e);
                self.ticks += 1;
                self.session.stop();
                // The toy must not keep rolling on the last command
                if let Err(e) = self.toy.set_speed(0) {
                    log::warn!("Failed to stop toy: {}", e);
                }
                return;
            }
            Err(e) => {
                log::warn!("Player {}: {}", self.session.player_id(), e);
                InputSnapshot::neutral()
            }
        };
        self.step(&snapshot, now);
    }

    /// One tick of control logic for an already-sampled snapshot
    pub fn step(&mut self, input: &InputSnapshot, now: Instant) {
        self.ticks += 1;
        self.run_stages(input, now);
        self.previous = input.pressed;
    }

    /// Tick stages in order; returns early once the session has stopped
    fn run_stages(&mut self, input: &InputSnapshot, now: Instant) {
        let toy = self.toy.as_mut();
        self.battery.maybe_check(now, &mut self.session, toy);
        if !self.session.is_running() {
            return;
        }

        let fed = match self.control.sequence_input {
            SequenceInput::Level => input.pressed,
            SequenceInput::Edge => input.pressed.pressed_since(self.previous),
        };
        if self.detector.feed(fed) {
            self.activate_cheat_mode();
            if !self.session.is_running() {
                return;
            }
        }

        if !self.session.cheat_mode() {
            self.apply_presets(input);
        }

        let held = input.pressed.contains(self.buttons.calibrate);
        let aiming = self.update_calibration(input, held, now);
        if !aiming {
            let command = self
                .mapper
                .map(input, self.session.base_heading(), self.session.speed());
            self.issue(command);
        }
        if !self.session.is_running() {
            return;
        }

        // Correction runs whenever the stick is held straight, aiming or not
        if self.session.cheat_mode() && self.mapper.is_straight(input) {
            self.straighten();
            if !self.session.is_running() {
                return;
            }
        }

        self.show_glyph();
    }

    fn activate_cheat_mode(&mut self) {
        if self.session.activate_cheat_mode(self.control.max_speed) {
            log::info!(
                "Player {}: cheat mode activated, speed pinned to {}",
                self.session.player_id(),
                self.control.max_speed
            );
        }
        let result = self.toy.set_front_led(CHEAT_COLOR);
        settle(&mut self.session, result);
    }

    fn apply_presets(&mut self, input: &InputSnapshot) {
        let Some(preset) = PRESETS
            .iter()
            .find(|p| input.pressed.contains(p.button))
            .copied()
        else {
            return;
        };
        let changed = self.session.speed() != preset.speed || self.session.color() != preset.color;
        if self.session.apply_preset(&preset) && changed {
            log::info!(
                "Player {}: preset {} -> speed {}, color {}",
                self.session.player_id(),
                preset.button,
                preset.speed,
                preset.color
            );
        }
    }

    /// Hold-to-aim: the press edge enters calibration, every held tick trims,
    /// the release edge exits. Returns whether this tick was spent aiming.
    fn update_calibration(&mut self, input: &InputSnapshot, held: bool, now: Instant) -> bool {
        let toy = self.toy.as_mut();
        if held && !self.session.is_calibrating() {
            self.calibration.toggle(&mut self.session, toy, input.x, now);
            true
        } else if held {
            self.calibration.trim(&mut self.session, toy, input.x);
            true
        } else {
            if self.session.is_calibrating() {
                self.calibration.toggle(&mut self.session, toy, input.x, now);
            }
            false
        }
    }

    /// Send heading then speed; a fatal heading failure skips the speed
    fn issue(&mut self, command: MotionCommand) {
        log::trace!("Motion: {:?}", command);
        let (heading, speed) = command.target();
        if let Some(heading) = heading {
            let result = self.toy.set_heading(heading);
            settle(&mut self.session, result);
            if !self.session.is_running() {
                return;
            }
        }
        let result = self.toy.set_speed(speed);
        settle(&mut self.session, result);
    }

    /// Pull the heading reference toward the toy's actual heading
    fn straighten(&mut self) {
        let result = self.toy.heading();
        let Some(actual) = settle(&mut self.session, result) else {
            return;
        };
        let Some(correction) = self.corrector.correction(actual, self.session.base_heading()) else {
            return;
        };

        self.session.apply_heading_correction(correction);
        log::debug!(
            "Auto-straighten: actual {:.1}, correction {:+.2}, base heading {:.1}",
            actual,
            correction,
            self.session.base_heading()
        );
        let result = self
            .toy
            .set_heading(normalize_heading(self.session.base_heading()));
        settle(&mut self.session, result);
    }

    fn show_glyph(&mut self) {
        let result = self
            .toy
            .set_display_glyph(self.session.glyph(), self.session.color());
        settle(&mut self.session, result);
    }

    /// Stop the toy and close the command session. Failures are only logged.
    fn shutdown(&mut self) {
        log::info!(
            "Player {}: stopping after {} ticks",
            self.session.player_id(),
            self.ticks
        );
        self.session.stop();
        if let Err(e) = self.toy.set_speed(0) {
            log::warn!("Failed to stop toy: {}", e);
        }
        if let Err(e) = self.toy.release() {
            log::warn!("Failed to release toy: {}", e);
        }
    }
}
