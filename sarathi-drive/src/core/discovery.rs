//! Toy discovery

use crate::core::actuator::ToyActuator;
use crate::error::Result;

/// A toy seen during discovery
#[derive(Debug, Clone, PartialEq)]
pub struct ToyHandle {
    /// Advertised name (e.g. "SB-1A2B")
    pub name: String,
    /// Signal strength in dBm, higher is nearer
    pub rssi: i16,
}

impl ToyHandle {
    pub fn new(name: impl Into<String>, rssi: i16) -> Self {
        Self {
            name: name.into(),
            rssi,
        }
    }
}

/// Which toy to connect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToyTarget {
    /// Exact advertised name
    Named(String),
    /// Strongest signal
    Nearest,
}

impl ToyTarget {
    /// `-` selects the nearest toy; anything else is a name
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            ToyTarget::Nearest
        } else {
            ToyTarget::Named(arg.to_string())
        }
    }
}

/// Discovery service trait
pub trait Scanner {
    /// Find a toy by exact name
    fn find_by_name(&mut self, name: &str) -> Result<ToyHandle>;

    /// Find the toy with the strongest signal
    fn find_nearest(&mut self) -> Result<ToyHandle>;

    /// Open a command session to a discovered toy
    fn connect(&mut self, handle: &ToyHandle) -> Result<Box<dyn ToyActuator>>;

    /// Resolve a [`ToyTarget`]
    fn find(&mut self, target: &ToyTarget) -> Result<ToyHandle> {
        match target {
            ToyTarget::Named(name) => self.find_by_name(name),
            ToyTarget::Nearest => self.find_nearest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse() {
        assert_eq!(ToyTarget::parse("-"), ToyTarget::Nearest);
        assert_eq!(
            ToyTarget::parse("SB-1A2B"),
            ToyTarget::Named("SB-1A2B".to_string())
        );
    }
}
