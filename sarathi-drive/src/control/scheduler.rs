//! Deadline-based tick pacing
//!
//! Each tick is scheduled at a fixed offset from the previous deadline
//! rather than "sleep N ms after the work", so coarse sleep granularity does
//! not accumulate into drift. If a tick overruns by more than a whole period
//! the schedule restarts from now instead of bursting to catch up.

use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    next: Instant,
    overruns: u64,
}

impl TickScheduler {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start,
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks that started late
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Advance to the next deadline; returns how long to sleep from `now`
    pub fn advance(&mut self, now: Instant) -> Duration {
        self.next += self.period;
        if self.next > now {
            return self.next - now;
        }

        self.overruns += 1;
        let behind = now - self.next;
        if behind >= self.period {
            log::debug!(
                "Tick overrun by {:.1}ms, resynchronizing",
                behind.as_secs_f64() * 1000.0
            );
            self.next = now;
        }
        Duration::ZERO
    }

    /// Block until the next deadline
    pub fn wait(&mut self) {
        let sleep = self.advance(Instant::now());
        if !sleep.is_zero() {
            thread::sleep(sleep);
        }
    }
}
