//! Pulse timing patterns

use serde::{Deserialize, Serialize};

/// How pulses are spaced within a signal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum SignalPattern {
    /// One pulse per second
    Steady,
    /// Gaps of 1, 1, 2, 3, 5, 8, ... units
    #[default]
    Fibonacci,
    /// One pulse, then the session ends
    Single,
}

/// Interval between steady pulses (ms)
pub const STEADY_INTERVAL_MS: u32 = 1000;

/// Running pulse schedule for one session
///
/// Offsets are measured from the session start. The first pulse is at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSchedule {
    pattern: SignalPattern,
    unit_ms: u32,
    next_offset_ms: u32,
    /// Fibonacci pair (previous, current) in units
    fib: (u32, u32),
    done: bool,
}

impl PulseSchedule {
    pub fn new(pattern: SignalPattern, unit_ms: u32) -> Self {
        Self {
            pattern,
            unit_ms: unit_ms.max(1),
            next_offset_ms: 0,
            fib: (0, 1),
            done: false,
        }
    }

    pub fn pattern(&self) -> SignalPattern {
        self.pattern
    }

    /// Offset of the next pulse, or `None` once the pattern is exhausted
    pub fn next_offset_ms(&self) -> Option<u32> {
        (!self.done).then_some(self.next_offset_ms)
    }

    /// Move past the current pulse
    pub fn advance(&mut self) {
        match self.pattern {
            SignalPattern::Steady => {
                self.next_offset_ms = self.next_offset_ms.saturating_add(STEADY_INTERVAL_MS);
            }
            SignalPattern::Fibonacci => {
                let (prev, curr) = self.fib;
                self.next_offset_ms = self
                    .next_offset_ms
                    .saturating_add(curr.saturating_mul(self.unit_ms));
                self.fib = (curr, prev.saturating_add(curr));
            }
            SignalPattern::Single => self.done = true,
        }
    }
}

impl Iterator for PulseSchedule {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let offset = self.next_offset_ms()?;
        self.advance();
        if offset == u32::MAX {
            self.done = true;
        }
        Some(offset)
    }
}
