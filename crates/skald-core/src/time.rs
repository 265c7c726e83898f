//! Simulation time
//!
//! One tick per rendered frame. The driver measures real frame time and
//! feeds it to `Clock::advance`; everything below the driver reads time
//! from the clock and never touches the OS clock, which keeps delay
//! deadlines testable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation tick counter
pub type Tick = u64;

/// Tick count and accumulated wall-clock time for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Completed simulation ticks
    pub tick: Tick,
    /// Simulated wall-clock time elapsed since session start
    pub elapsed: Duration,
}

impl Clock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `dt` real time
    pub fn advance(&mut self, dt: Duration) {
        self.tick += 1;
        self.elapsed += dt;
    }

    /// Deadline `seconds` from now, on this clock
    pub fn deadline_in(&self, seconds: f64) -> Duration {
        self.elapsed + Duration::from_secs_f64(seconds.max(0.0))
    }

    /// True once the clock has reached `deadline`
    pub fn has_reached(&self, deadline: Duration) -> bool {
        self.elapsed >= deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_ticks_and_time() {
        let mut clock = Clock::new();
        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.tick, 2);
        assert_eq!(clock.elapsed, Duration::from_millis(32));
    }

    #[test]
    fn test_deadline_reached_on_first_tick_past() {
        let mut clock = Clock::new();
        let deadline = clock.deadline_in(0.05);
        assert!(!clock.has_reached(deadline));

        clock.advance(Duration::from_millis(40));
        assert!(!clock.has_reached(deadline));

        clock.advance(Duration::from_millis(40));
        assert!(clock.has_reached(deadline));
    }

    #[test]
    fn test_negative_delay_is_immediate() {
        let clock = Clock::new();
        let deadline = clock.deadline_in(-3.0);
        assert!(clock.has_reached(deadline));
    }
}
