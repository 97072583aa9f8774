/*
 * Simulated Global Clock
 *
 * This module implements the single simulated-time register shared by every
 * worker thread. Time only moves forward, and it moves in bounded steps:
 * each call advances the clock to the earlier of "one tick past the current
 * time" and "the arrival time the caller just reported".
 *
 * This keeps the simulation honest when callers report times out of order:
 * a late report can never drag the clock backward, and an early report can
 * never make the clock skip over a tick at which another task arrives.
 */

use parking_lot::Mutex;

/// Monotonic simulated-time register.
///
/// The clock is a leaf lock: it is never held while any other scheduler
/// lock is acquired.
#[derive(Debug)]
pub struct SimClock {
    now: Mutex<f64>,
}

impl SimClock {
    /// Create a clock starting at simulated time 0.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(0.0),
        }
    }

    /// Advance the clock toward a reported arrival time.
    ///
    /// The new time is `max(now, min(now + 1.0, reported))`: at most one
    /// tick forward per call, never backward.
    ///
    /// # Returns
    /// The clock value after the advance.
    pub fn advance(&self, reported: f64) -> f64 {
        let mut now = self.now.lock();
        let stepped = (*now + 1.0).min(reported);
        if stepped > *now {
            *now = stepped;
        }
        *now
    }

    /// Read the current simulated time.
    pub fn now(&self) -> f64 {
        *self.now.lock()
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_advances_toward_reported_time() {
        let clock = SimClock::new();
        assert_eq!(clock.advance(0.5), 0.5);
        assert_eq!(clock.now(), 0.5);
    }

    #[test]
    fn test_step_is_capped_at_one_tick() {
        let clock = SimClock::new();
        // A report far in the future still only moves the clock one tick.
        assert_eq!(clock.advance(100.0), 1.0);
        assert_eq!(clock.advance(100.0), 2.0);
    }

    #[test]
    fn test_never_moves_backward() {
        let clock = SimClock::new();
        clock.advance(1.0);
        clock.advance(2.0);
        assert_eq!(clock.now(), 2.0);
        // Stale report from the past is ignored.
        assert_eq!(clock.advance(0.5), 2.0);
    }
}
