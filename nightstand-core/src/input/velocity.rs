//! Rotary velocity classification
//!
//! Velocity is a pure function of the last few step timestamps: `High`
//! when the window is full and the mean step interval is below the engage
//! threshold. There is no latched state, so a single slow or fast step at
//! the boundary cannot make it flip back and forth.

use heapless::Deque;

use super::events::Velocity;
use crate::time::Instant;

/// Number of step timestamps considered
pub const VELOCITY_WINDOW: usize = 4;

/// Rate-window velocity tracker
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    steps: Deque<Instant, VELOCITY_WINDOW>,
    engage_ms: u32,
    disengage_ms: u32,
}

impl VelocityTracker {
    pub fn new(engage_ms: u32, disengage_ms: u32) -> Self {
        Self {
            steps: Deque::new(),
            engage_ms,
            disengage_ms,
        }
    }

    /// Record one step at `now` and classify
    pub fn record(&mut self, now: Instant) -> Velocity {
        if let Some(last) = self.steps.back() {
            if now.since(*last) > self.disengage_ms {
                self.steps.clear();
            }
        }
        if self.steps.is_full() {
            self.steps.pop_front();
        }
        // Cannot fail: a slot was freed above
        let _ = self.steps.push_back(now);
        self.classify()
    }

    /// Current classification of the window
    pub fn classify(&self) -> Velocity {
        if !self.steps.is_full() {
            return Velocity::Low;
        }
        let (Some(first), Some(last)) = (self.steps.front(), self.steps.back()) else {
            return Velocity::Low;
        };
        let mean = last.since(*first) / (VELOCITY_WINDOW as u32 - 1);
        if mean < self.engage_ms {
            Velocity::High
        } else {
            Velocity::Low
        }
    }

    pub fn reset(&mut self) {
        self.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u32) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_needs_full_window() {
        let mut v = VelocityTracker::new(80, 500);
        assert_eq!(v.record(at(0)), Velocity::Low);
        assert_eq!(v.record(at(10)), Velocity::Low);
        assert_eq!(v.record(at(20)), Velocity::Low);
        assert_eq!(v.record(at(30)), Velocity::High);
    }

    #[test]
    fn test_slow_steps_stay_low() {
        let mut v = VelocityTracker::new(80, 500);
        for i in 0..8 {
            assert_eq!(v.record(at(i * 100)), Velocity::Low);
        }
    }

    #[test]
    fn test_gap_empties_window() {
        let mut v = VelocityTracker::new(80, 500);
        for i in 0..4 {
            v.record(at(i * 10));
        }
        assert_eq!(v.classify(), Velocity::High);
        assert_eq!(v.record(at(1000)), Velocity::Low);
    }

    #[test]
    fn test_single_slow_step_does_not_flip() {
        let mut v = VelocityTracker::new(80, 500);
        for i in 0..6 {
            v.record(at(i * 40));
        }
        // One 120 ms step keeps the mean of three intervals below 80 ms
        assert_eq!(v.record(at(200 + 120)), Velocity::High);
    }

    #[test]
    fn test_across_wrap() {
        let mut v = VelocityTracker::new(80, 500);
        let base = u32::MAX - 15;
        for i in 0..4u32 {
            v.record(at(base.wrapping_add(i * 10)));
        }
        assert_eq!(v.classify(), Velocity::High);
    }
}
