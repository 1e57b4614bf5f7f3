//! Drift-corrected software clock
//!
//! When no hardware RTC is fitted the clock is derived from the free-running
//! millisecond counter. Crystal oscillators run a little fast or slow, so a
//! signed per-second correction is added every time a whole correction
//! interval elapses.

use super::clock_time::ClockTime;
use super::instant::Instant;

/// Largest correction applied for a single interval (ms)
///
/// Caps the visible clock at one whole-second step per interval.
pub const MAX_CORRECTION_MS: i64 = 1000;

/// Periodic drift correction bookkeeping
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriftState {
    /// Correction in ms per elapsed second (positive runs the clock faster)
    drift_ms_per_s: i16,
    /// Correction interval in seconds
    interval_s: u16,
    /// Start of the first interval not yet corrected
    last_correction: Instant,
    /// Total correction applied since the last reset (ms)
    applied_ms: i64,
}

impl DriftState {
    /// Create a new drift tracker starting at `now`
    pub fn new(drift_ms_per_s: i16, interval_s: u16, now: Instant) -> Self {
        Self {
            drift_ms_per_s,
            interval_s: interval_s.max(1),
            last_correction: now,
            applied_ms: 0,
        }
    }

    /// Restart interval tracking from `now`
    pub fn reset(&mut self, now: Instant) {
        self.last_correction = now;
        self.applied_ms = 0;
    }

    fn interval_ms(&self) -> u32 {
        u32::from(self.interval_s) * 1000
    }

    /// Correction applied for one full interval (ms)
    pub fn per_interval_ms(&self) -> i64 {
        (i64::from(self.drift_ms_per_s) * i64::from(self.interval_s))
            .clamp(-MAX_CORRECTION_MS, MAX_CORRECTION_MS)
    }

    /// Collect the correction due at `now`
    ///
    /// Returns the correction for every whole interval elapsed since the
    /// last call. The interval start advances by exact multiples of the
    /// interval, so no interval is counted twice or skipped even when
    /// called late.
    pub fn check(&mut self, now: Instant) -> i64 {
        let interval_ms = self.interval_ms();
        let intervals = now.since(self.last_correction) / interval_ms;
        if intervals == 0 {
            return 0;
        }

        self.last_correction = self.last_correction + intervals * interval_ms;
        let correction = self.per_interval_ms() * i64::from(intervals);
        self.applied_ms += correction;
        correction
    }

    /// Total correction applied since the last reset
    pub fn applied_ms(&self) -> i64 {
        self.applied_ms
    }

    /// Drift-corrected millisecond counter
    ///
    /// Wraps like the raw counter. With a negative drift constant it steps
    /// back by at most one correction when an interval completes.
    pub fn corrected_millis(&self, now: Instant) -> Instant {
        Instant::from_millis((i64::from(now.as_millis()) + self.applied_ms) as u32)
    }
}

/// Free-running clock over the millisecond counter
#[derive(Debug, Clone)]
pub struct SoftClock {
    /// Seconds since 2000-01-01 00:00:00
    seconds: u32,
    /// Milliseconds into the current second
    sub_ms: i64,
    last_sample: Instant,
    drift: DriftState,
}

impl SoftClock {
    pub fn new(time: ClockTime, now: Instant, drift_ms_per_s: i16, interval_s: u16) -> Self {
        Self {
            seconds: time.to_seconds(),
            sub_ms: 0,
            last_sample: now,
            drift: DriftState::new(drift_ms_per_s, interval_s, now),
        }
    }

    /// Jump to a known time (user edit or good RTC read)
    pub fn set(&mut self, time: ClockTime, now: Instant) {
        self.seconds = time.to_seconds();
        self.sub_ms = 0;
        self.last_sample = now;
        self.drift.reset(now);
    }

    /// Advance to `now`, applying any due drift correction
    ///
    /// The clock never moves backward by more than one second per call.
    pub fn advance(&mut self, now: Instant) {
        let raw = now.since(self.last_sample);
        self.last_sample = now;

        let total = self.sub_ms + i64::from(raw) + self.drift.check(now);
        let (mut whole, mut rem) = (total.div_euclid(1000), total.rem_euclid(1000));
        if whole < -1 {
            whole = -1;
            rem = 0;
        }

        self.seconds = (i64::from(self.seconds) + whole).clamp(0, i64::from(u32::MAX)) as u32;
        self.sub_ms = rem;
    }

    /// Seconds since 2000-01-01
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Current date-time, or `None` past the supported range
    pub fn time(&self) -> Option<ClockTime> {
        ClockTime::from_seconds(self.seconds).ok()
    }

    pub fn drift(&self) -> &DriftState {
        &self.drift
    }
}
