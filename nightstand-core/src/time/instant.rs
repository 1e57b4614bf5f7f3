//! Wrapping millisecond timestamps
//!
//! The loop is driven by a free-running `u32` millisecond counter that
//! wraps every 2^32 ms (about 49.7 days). Every duration comparison in the
//! crate goes through [`Instant::since`], which uses wrapping subtraction
//! and therefore tolerates exactly one wrap between the two samples.

use core::ops::Add;

/// Full wrap period of the tick counter in milliseconds
pub const WRAP_PERIOD_MS: u64 = 1 << 32;

/// A point on the monotonic millisecond counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u32);

impl Instant {
    /// Create from a raw counter value
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Raw counter value
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`
    ///
    /// Correct as long as less than one full wrap period separates them.
    pub const fn since(self, earlier: Instant) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Has at least `duration_ms` elapsed since `earlier`?
    pub const fn has_elapsed(self, earlier: Instant, duration_ms: u32) -> bool {
        self.since(earlier) >= duration_ms
    }
}

impl Add<u32> for Instant {
    type Output = Instant;

    fn add(self, ms: u32) -> Instant {
        Instant(self.0.wrapping_add(ms))
    }
}
