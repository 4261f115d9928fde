//! Imperfections of the simulated toy
//!
//! The simulator reads its compass and battery through [`SimNoise`] and asks
//! it whether each radio packet got through. A fixed `[sim] seed` replays the
//! same drive; seed 0 draws a fresh run from entropy.

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{Bernoulli, Normal};

/// Compass jitter, degrees (1 sigma)
pub const HEADING_SIGMA_DEG: f32 = 0.4;

/// Battery ADC jitter, volts (1 sigma)
pub const VOLTAGE_SIGMA: f32 = 0.01;

pub struct SimNoise {
    rng: SmallRng,
}

impl SimNoise {
    pub fn new(seed: u64) -> Self {
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        Self { rng }
    }

    /// Compass reading around the true heading (not normalized)
    pub fn compass(&mut self, true_heading: f32) -> f32 {
        true_heading + self.gaussian(HEADING_SIGMA_DEG)
    }

    /// Battery reading around the true voltage
    pub fn voltmeter(&mut self, true_volts: f32) -> f32 {
        true_volts + self.gaussian(VOLTAGE_SIGMA)
    }

    /// Whether one packet is lost at the given loss rate (0.0..=1.0)
    pub fn packet_lost(&mut self, loss_rate: f32) -> bool {
        match Bernoulli::new(f64::from(loss_rate)) {
            Ok(dist) if loss_rate > 0.0 => self.rng.sample(dist),
            _ => false,
        }
    }

    fn gaussian(&mut self, sigma: f32) -> f32 {
        match Normal::new(0.0f32, sigma) {
            Ok(dist) if sigma > 0.0 => self.rng.sample(dist),
            _ => 0.0,
        }
    }
}
