//! Mock devices for testing
//!
//! All mocks share their state behind an `Arc`, so a test can keep a clone
//! and inspect (or script) a device after the control loop has taken
//! ownership of the boxed device.

use crate::config::ButtonMap;
use crate::core::actuator::ToyActuator;
use crate::core::discovery::{Scanner, ToyHandle};
use crate::core::input::InputSource;
use crate::core::types::{Button, Rgb};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// One recorded call on a [`MockToy`]
#[derive(Debug, Clone, PartialEq)]
pub enum ToyCall {
    SetHeading(f32),
    SetSpeed(u8),
    SetFrontLed(Rgb),
    SetDisplayGlyph(char, Rgb),
    GetHeading,
    ReadBattery,
    Release,
}

/// Recording toy.
///
/// Every attempted call is recorded, including ones that fail. Failures are
/// injected per operation name (`"set_heading"`, `"set_speed"`,
/// `"set_front_led"`, `"set_display_glyph"`, `"heading"`,
/// `"battery_voltage"`, `"release"`).
#[derive(Clone)]
pub struct MockToy {
    name: String,
    inner: Arc<Mutex<MockToyInner>>,
}

struct MockToyInner {
    calls: Vec<ToyCall>,
    actual_heading: Option<f32>,
    voltage: f32,
    failing: HashSet<&'static str>,
    disconnected: bool,
}

impl MockToy {
    pub fn new(name: impl Into<String>) -> Self {
        MockToy {
            name: name.into(),
            inner: Arc::new(Mutex::new(MockToyInner {
                calls: Vec::new(),
                actual_heading: None,
                voltage: 4.2,
                failing: HashSet::new(),
                disconnected: false,
            })),
        }
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<ToyCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls other than glyph refreshes
    pub fn commands(&self) -> Vec<ToyCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, ToyCall::SetDisplayGlyph(..)))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn last_heading_command(&self) -> Option<f32> {
        self.inner.lock().calls.iter().rev().find_map(|c| match c {
            ToyCall::SetHeading(h) => Some(*h),
            _ => None,
        })
    }

    pub fn last_speed(&self) -> Option<u8> {
        self.inner.lock().calls.iter().rev().find_map(|c| match c {
            ToyCall::SetSpeed(s) => Some(*s),
            _ => None,
        })
    }

    pub fn last_led(&self) -> Option<Rgb> {
        self.inner.lock().calls.iter().rev().find_map(|c| match c {
            ToyCall::SetFrontLed(color) => Some(*color),
            _ => None,
        })
    }

    pub fn last_glyph(&self) -> Option<(char, Rgb)> {
        self.inner.lock().calls.iter().rev().find_map(|c| match c {
            ToyCall::SetDisplayGlyph(glyph, color) => Some((*glyph, *color)),
            _ => None,
        })
    }

    /// Heading reported by `heading()`. Unset, the toy reports the last
    /// commanded heading (no drift).
    pub fn set_actual_heading(&self, degrees: f32) {
        self.inner.lock().actual_heading = Some(degrees);
    }

    pub fn set_voltage(&self, volts: f32) {
        self.inner.lock().voltage = volts;
    }

    /// Make every future call of `op` fail with a recoverable error
    pub fn fail(&self, op: &'static str) {
        self.inner.lock().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.inner.lock().failing.remove(op);
    }

    /// Drop the link: every future call fails with [`Error::Disconnected`]
    pub fn disconnect(&self) {
        self.inner.lock().disconnected = true;
    }

    fn record(&self, call: ToyCall, op: &'static str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.disconnected {
            return Err(Error::Disconnected(self.name.clone()));
        }
        if inner.failing.contains(op) {
            return Err(Error::actuator(op, "injected failure"));
        }
        Ok(())
    }
}

impl ToyActuator for MockToy {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_heading(&mut self, degrees: f32) -> Result<()> {
        self.record(ToyCall::SetHeading(degrees), "set_heading")
    }

    fn set_speed(&mut self, magnitude: u8) -> Result<()> {
        self.record(ToyCall::SetSpeed(magnitude), "set_speed")
    }

    fn set_front_led(&mut self, color: Rgb) -> Result<()> {
        self.record(ToyCall::SetFrontLed(color), "set_front_led")
    }

    fn set_display_glyph(&mut self, glyph: char, color: Rgb) -> Result<()> {
        self.record(ToyCall::SetDisplayGlyph(glyph, color), "set_display_glyph")
    }

    fn heading(&mut self) -> Result<f32> {
        self.record(ToyCall::GetHeading, "heading")?;
        let actual = self.inner.lock().actual_heading;
        Ok(actual
            .or_else(|| self.last_heading_command())
            .unwrap_or(0.0))
    }

    fn battery_voltage(&mut self) -> Result<f32> {
        self.record(ToyCall::ReadBattery, "battery_voltage")?;
        Ok(self.inner.lock().voltage)
    }

    fn release(&mut self) -> Result<()> {
        self.record(ToyCall::Release, "release")
    }
}

/// Controller that replays queued frames, one per poll.
///
/// When the queue runs dry the last frame stays held, like a real pad whose
/// sticks nobody touches.
#[derive(Clone)]
pub struct ScriptedInput {
    map: ButtonMap,
    inner: Arc<Mutex<ScriptedInputInner>>,
}

#[derive(Default)]
struct ScriptedInputInner {
    frames: VecDeque<Frame>,
    current: Frame,
    polls: usize,
    disconnected: bool,
}

#[derive(Debug, Clone, Default)]
struct Frame {
    axes: Vec<f32>,
    buttons: HashSet<usize>,
}

impl ScriptedInput {
    pub fn new(map: ButtonMap) -> Self {
        Self {
            map,
            inner: Arc::new(Mutex::new(ScriptedInputInner::default())),
        }
    }

    /// Queue one frame: stick position plus held symbols
    pub fn push(&self, x: f32, y: f32, pressed: &[Button]) {
        let mut axes = vec![0.0; self.map.x_axis.max(self.map.y_axis) + 1];
        axes[self.map.x_axis] = x;
        axes[self.map.y_axis] = y;
        let buttons = pressed.iter().map(|b| self.map.index(*b)).collect();
        self.inner.lock().frames.push_back(Frame { axes, buttons });
    }

    /// Frames not yet consumed
    pub fn pending(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn polls(&self) -> usize {
        self.inner.lock().polls
    }

    /// Unplug the controller: every future poll fails
    pub fn disconnect(&self) {
        self.inner.lock().disconnected = true;
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.polls += 1;
        if inner.disconnected {
            return Err(Error::InputUnavailable("controller disconnected".to_string()));
        }
        if let Some(frame) = inner.frames.pop_front() {
            inner.current = frame;
        }
        Ok(())
    }

    fn axis(&self, index: usize) -> f32 {
        self.inner
            .lock()
            .current
            .axes
            .get(index)
            .copied()
            .unwrap_or(0.0)
    }

    fn button_pressed(&self, index: usize) -> bool {
        self.inner.lock().current.buttons.contains(&index)
    }
}

/// Scanner over a fixed set of [`MockToy`]s
#[derive(Default)]
pub struct MockScanner {
    toys: Vec<(ToyHandle, MockToy)>,
    scans: usize,
    connects: usize,
    refuse_connect: bool,
}

impl MockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a toy discoverable; returns a handle for inspecting it later
    pub fn add_toy(&mut self, name: &str, rssi: i16) -> MockToy {
        let toy = MockToy::new(name);
        self.toys.push((ToyHandle::new(name, rssi), toy.clone()));
        toy
    }

    /// Make every connect attempt fail
    pub fn refuse_connections(&mut self) {
        self.refuse_connect = true;
    }

    /// Lookups performed (by name or nearest)
    pub fn scans(&self) -> usize {
        self.scans
    }

    pub fn connects(&self) -> usize {
        self.connects
    }
}

impl Scanner for MockScanner {
    fn find_by_name(&mut self, name: &str) -> Result<ToyHandle> {
        self.scans += 1;
        self.toys
            .iter()
            .find(|(handle, _)| handle.name == name)
            .map(|(handle, _)| handle.clone())
            .ok_or_else(|| Error::ToyNotFound(name.to_string()))
    }

    fn find_nearest(&mut self) -> Result<ToyHandle> {
        self.scans += 1;
        self.toys
            .iter()
            .max_by_key(|(handle, _)| handle.rssi)
            .map(|(handle, _)| handle.clone())
            .ok_or(Error::NoToysFound)
    }

    fn connect(&mut self, handle: &ToyHandle) -> Result<Box<dyn ToyActuator>> {
        self.connects += 1;
        if self.refuse_connect {
            return Err(Error::Connect(format!("{} refused the session", handle.name)));
        }
        let (_, toy) = self
            .toys
            .iter()
            .find(|(h, _)| h.name == handle.name)
            .ok_or_else(|| Error::ToyNotFound(handle.name.clone()))?;
        Ok(Box::new(toy.clone()))
    }
}
