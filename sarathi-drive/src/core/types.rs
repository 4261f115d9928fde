//! Core value types shared by the control loop and device backends.
//!
//! Key types:
//! - [`Rgb`]: LED / matrix colour
//! - [`Button`]: typed controller symbols, with a fixed enumeration order
//! - [`ButtonSet`]: the set of symbols pressed in one tick
//! - [`InputSnapshot`]: one tick's worth of sampled controller state

use serde::{Deserialize, Serialize};
use std::fmt;

/// 24-bit colour for the front LED and the display matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const ORANGE: Rgb = Rgb::new(255, 100, 0);
    pub const PURPLE: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Controller symbols.
///
/// Declaration order is the enumeration order used whenever several symbols
/// are pressed in the same tick (see [`ButtonSet::iter`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    L1,
    R1,
    L2,
    R2,
    #[serde(rename = "SELECT")]
    Select,
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "LEFT")]
    Left,
    #[serde(rename = "RIGHT")]
    Right,
    B,
    A,
}

impl Button {
    /// Number of symbols
    pub const COUNT: usize = 16;

    /// All symbols in enumeration order
    pub const ALL: [Button; Button::COUNT] = [
        Button::One,
        Button::Two,
        Button::Three,
        Button::Four,
        Button::L1,
        Button::R1,
        Button::L2,
        Button::R2,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::B,
        Button::A,
    ];

    /// Display name (matches the configuration spelling)
    pub fn name(self) -> &'static str {
        match self {
            Button::One => "1",
            Button::Two => "2",
            Button::Three => "3",
            Button::Four => "4",
            Button::L1 => "L1",
            Button::R1 => "R1",
            Button::L2 => "L2",
            Button::R2 => "R2",
            Button::Select => "SELECT",
            Button::Start => "START",
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::B => "B",
            Button::A => "A",
        }
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of pressed symbols (one bit per [`Button`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSet(u16);

impl ButtonSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    #[inline]
    pub fn contains(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Symbols in `self` that are not in `previous` (press edges)
    pub fn pressed_since(&self, previous: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !previous.0)
    }

    /// Pressed symbols in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.contains(*b))
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<T: IntoIterator<Item = Button>>(iter: T) -> Self {
        let mut set = ButtonSet::empty();
        for button in iter {
            set.insert(button);
        }
        set
    }
}

/// Controller state sampled at the top of a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Left/right axis in [-1, 1] (negative = left)
    pub x: f32,
    /// Forward/back axis in [-1, 1] (negative = forward)
    pub y: f32,
    /// Symbols held down this tick
    pub pressed: ButtonSet,
}

impl InputSnapshot {
    pub fn new(x: f32, y: f32, pressed: ButtonSet) -> Self {
        Self { x, y, pressed }
    }

    /// Centered sticks, nothing pressed
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Session phase: `Idle -> Calibrating <-> Driving`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connected, never calibrated
    Idle,
    /// Aiming: speed held at zero while the heading reference is trimmed
    Calibrating,
    /// Calibrated at least once
    Driving,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_enumeration_order() {
        let set: ButtonSet = [Button::A, Button::Up, Button::One].into_iter().collect();
        let order: Vec<Button> = set.iter().collect();
        assert_eq!(order, vec![Button::One, Button::Up, Button::A]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_pressed_since() {
        let before: ButtonSet = [Button::Up].into_iter().collect();
        let now: ButtonSet = [Button::Up, Button::B].into_iter().collect();
        let edges = now.pressed_since(before);
        assert!(edges.contains(Button::B));
        assert!(!edges.contains(Button::Up));
        assert!(now.pressed_since(now).is_empty());
    }

    #[test]
    fn test_button_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            buttons: Vec<Button>,
        }
        let parsed: Wrapper = toml::from_str(r#"buttons = ["UP", "1", "L1", "SELECT", "B"]"#).unwrap();
        assert_eq!(
            parsed.buttons,
            vec![
                Button::Up,
                Button::One,
                Button::L1,
                Button::Select,
                Button::B
            ]
        );
    }
}
