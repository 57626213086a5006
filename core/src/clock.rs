//! Live tick clock: owns tick count, fixed tick length, and pause.

use crate::types::{Seconds, Tick};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Real-time interval between live ticks.
pub const TICK_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickClock {
    pub current_tick: Tick,
    pub paused:       bool,
    /// Simulated seconds advanced by live ticks this session.
    pub elapsed:      Seconds,
}

impl Default for TickClock {
    fn default() -> Self { Self::new() }
}

impl TickClock {
    pub fn new() -> Self {
        Self { current_tick: 0, paused: false, elapsed: 0.0 }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while paused; callers check first.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.elapsed += Self::tick_seconds();
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn interval() -> Duration {
        Duration::from_millis(TICK_INTERVAL_MS)
    }

    pub fn tick_seconds() -> Seconds {
        TICK_INTERVAL_MS as f64 / 1000.0
    }
}
