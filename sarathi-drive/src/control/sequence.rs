//! Button-sequence detector
//!
//! Matches a fixed target sequence against the symbols pressed each tick.
//! Every pressed symbol is compared with the expected one at the cursor,
//! in [`Button`] enumeration order:
//!
//! - match: advance; on reaching the end, report completion and re-arm at 0
//! - mismatch: reset to 0 (the mismatching symbol is not re-tested as a
//!   possible first element)
//!
//! A tick with several pressed symbols can therefore advance more than once,
//! or advance and reset in the same tick. Held buttons are fed again on every
//! tick unless the caller only passes press edges
//! (see [`crate::config::SequenceInput`]).

use crate::core::types::{Button, ButtonSet};

#[derive(Debug, Clone)]
pub struct SequenceDetector {
    target: Vec<Button>,
    cursor: usize,
}

impl SequenceDetector {
    pub fn new(target: Vec<Button>) -> Self {
        if target.is_empty() {
            log::warn!("Empty target sequence; detector will never fire");
        }
        Self { target, cursor: 0 }
    }

    /// Progress into the target (0..len)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn target(&self) -> &[Button] {
        &self.target
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Feed one tick's pressed symbols. Returns true if the sequence
    /// completed during this tick.
    pub fn feed(&mut self, pressed: ButtonSet) -> bool {
        if self.target.is_empty() {
            return false;
        }

        let mut completed = false;
        for button in pressed.iter() {
            if button == self.target[self.cursor] {
                self.cursor += 1;
                if self.cursor == self.target.len() {
                    completed = true;
                    self.cursor = 0;
                }
            } else {
                self.cursor = 0;
            }
        }
        completed
    }
}
