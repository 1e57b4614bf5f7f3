//! Authoritative clock
//!
//! The [`Timekeeper`] owns the current [`ClockTime`]. With a hardware RTC
//! it reads the chip every tick and keeps a [`SoftClock`] in step as a
//! fallback; without one the soft clock is the only source. It also
//! detects second/minute/hour/day edges and applies automatic DST.

use crate::traits::{TimeSource, TimeSourceError};

use super::clock_time::ClockTime;
use super::drift::SoftClock;
use super::dst::DstRule;
use super::instant::Instant;

const SECONDS_PER_HOUR: i32 = 3600;

/// Where the current time comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSourceKind {
    /// Free-running millisecond counter with drift correction
    #[default]
    Millis,
    /// External real-time clock chip
    Hardware,
}

/// Calendar edges crossed during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeEvents {
    pub second: bool,
    pub minute: bool,
    pub hour: bool,
    pub day: bool,
}

impl TimeEvents {
    fn between(old: &ClockTime, new: &ClockTime) -> Self {
        let day = old.day_count() != new.day_count();
        let hour = day || old.hour() != new.hour();
        let minute = hour || old.minute() != new.minute();
        let second = minute || old.second() != new.second();
        Self {
            second,
            minute,
            hour,
            day,
        }
    }
}

/// Owner of the current date and time
#[derive(Debug, Clone)]
pub struct Timekeeper {
    kind: TimeSourceKind,
    soft: SoftClock,
    current: ClockTime,
    source_ok: bool,
    dst_rule: DstRule,
    dst_active: bool,
}

impl Timekeeper {
    /// Create a timekeeper starting at `initial`
    pub fn new(
        kind: TimeSourceKind,
        initial: ClockTime,
        now: Instant,
        drift_ms_per_s: i16,
        drift_interval_s: u16,
    ) -> Self {
        Self {
            kind,
            soft: SoftClock::new(initial, now, drift_ms_per_s, drift_interval_s),
            current: initial,
            source_ok: true,
            dst_rule: DstRule::Off,
            dst_active: false,
        }
    }

    /// Configure automatic DST
    ///
    /// `active` is the persisted flag saying whether the stored time
    /// already includes the DST hour.
    pub fn set_dst(&mut self, rule: DstRule, active: bool) {
        self.dst_rule = rule;
        self.dst_active = active;
    }

    pub fn dst_rule(&self) -> DstRule {
        self.dst_rule
    }

    pub fn dst_active(&self) -> bool {
        self.dst_active
    }

    pub fn kind(&self) -> TimeSourceKind {
        self.kind
    }

    /// Current date and time
    pub fn now(&self) -> ClockTime {
        self.current
    }

    /// Whether the last hardware read succeeded
    pub fn source_ok(&self) -> bool {
        self.source_ok
    }

    /// Drift-corrected millisecond counter
    pub fn corrected_millis(&self, now: Instant) -> Instant {
        self.soft.drift().corrected_millis(now)
    }

    /// Advance the clock for one tick
    pub fn tick<S: TimeSource>(&mut self, source: &mut S, now: Instant) -> TimeEvents {
        self.soft.advance(now);

        let next = match self.kind {
            TimeSourceKind::Hardware => match source.read_time() {
                Ok(time) => {
                    if !self.source_ok {
                        info!("Time source recovered");
                        self.source_ok = true;
                    }
                    // Keep the drift state unless the soft clock disagrees
                    if self.soft.time() != Some(time) {
                        self.soft.set(time, now);
                    }
                    time
                }
                Err(TimeSourceError::SourceUnavailable) => {
                    if self.source_ok {
                        warn!("Time source unavailable, running from software clock");
                        self.source_ok = false;
                    }
                    self.soft.time().unwrap_or(self.current)
                }
            },
            TimeSourceKind::Millis => self.soft.time().unwrap_or(self.current),
        };

        let events = TimeEvents::between(&self.current, &next);
        self.current = next;

        if events.hour {
            self.apply_dst(source, now);
        }

        events
    }

    /// Shift by an hour when the DST rule disagrees with the stored flag
    ///
    /// Nothing happens inside the repeated hour after fall-back, so the
    /// clock does not bounce back and forth.
    fn apply_dst<S: TimeSource>(&mut self, source: &mut S, now: Instant) {
        if self.dst_rule == DstRule::Off {
            return;
        }

        let t = self.current;
        let status = self
            .dst_rule
            .is_dst_by_hour(t.year(), t.month(), t.day(), t.hour());
        if status.dst == self.dst_active || status.ambiguous {
            return;
        }

        let shift = if status.dst {
            SECONDS_PER_HOUR
        } else {
            -SECONDS_PER_HOUR
        };
        let Ok(shifted) = t.offset_seconds(shift) else {
            return;
        };

        info!("DST {}", if status.dst { "start" } else { "end" });
        self.dst_active = status.dst;
        // A failed RTC write is already logged; the soft clock carries on
        let _ = self.store(source, shifted, now);
    }

    /// Set the clock after a user edit
    ///
    /// The value is already a valid [`ClockTime`], so only the write to
    /// the hardware source can fail; the soft clock is updated regardless.
    pub fn set_time<S: TimeSource>(
        &mut self,
        source: &mut S,
        time: ClockTime,
        now: Instant,
    ) -> Result<(), TimeSourceError> {
        if self.dst_rule != DstRule::Off {
            self.dst_active = self
                .dst_rule
                .is_dst_by_hour(time.year(), time.month(), time.day(), time.hour())
                .dst;
        }
        self.store(source, time, now)
    }

    fn store<S: TimeSource>(
        &mut self,
        source: &mut S,
        time: ClockTime,
        now: Instant,
    ) -> Result<(), TimeSourceError> {
        self.current = time;
        self.soft.set(time, now);
        if self.kind == TimeSourceKind::Hardware {
            if let Err(e) = source.write_time(time) {
                debug!("RTC write failed: {}", e);
                self.source_ok = false;
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockRtc {
        time: ClockTime,
        fail: bool,
        writes: u32,
    }

    impl MockRtc {
        fn new(time: ClockTime) -> Self {
            Self {
                time,
                fail: false,
                writes: 0,
            }
        }
    }

    impl TimeSource for MockRtc {
        fn read_time(&mut self) -> Result<ClockTime, TimeSourceError> {
            if self.fail {
                Err(TimeSourceError::SourceUnavailable)
            } else {
                Ok(self.time)
            }
        }

        fn write_time(&mut self, time: ClockTime) -> Result<(), TimeSourceError> {
            self.writes += 1;
            self.time = time;
            Ok(())
        }
    }

    fn t(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8) -> ClockTime {
        ClockTime::new(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_millis_source_advances() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut keeper = Timekeeper::new(TimeSourceKind::Millis, start, Instant::from_millis(0), 0, 1);
        let mut rtc = crate::traits::NoTimeSource;

        let events = keeper.tick(&mut rtc, Instant::from_millis(999));
        assert!(!events.second);
        let events = keeper.tick(&mut rtc, Instant::from_millis(1000));
        assert!(events.second);
        assert!(!events.minute);
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 1));
    }

    #[test]
    fn test_edges_cascade() {
        let start = t(2024, 12, 31, 23, 59, 59);
        let mut keeper = Timekeeper::new(TimeSourceKind::Millis, start, Instant::from_millis(0), 0, 1);
        let events = keeper.tick(&mut crate::traits::NoTimeSource, Instant::from_millis(1000));
        assert_eq!(
            events,
            TimeEvents {
                second: true,
                minute: true,
                hour: true,
                day: true
            }
        );
        assert_eq!(keeper.now(), t(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_hardware_read_used() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut rtc = MockRtc::new(t(2024, 3, 1, 12, 30, 0));
        let mut keeper = Timekeeper::new(TimeSourceKind::Hardware, start, Instant::from_millis(0), 0, 1);

        let events = keeper.tick(&mut rtc, Instant::from_millis(10));
        assert!(events.minute);
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 30, 0));
        assert!(keeper.source_ok());
    }

    #[test]
    fn test_agreeing_reads_keep_drift_state() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut rtc = MockRtc::new(start);
        let mut keeper = Timekeeper::new(TimeSourceKind::Hardware, start, Instant::from_millis(0), 5, 1);

        for i in 1..=30u32 {
            rtc.time = t(2024, 3, 1, 12, 0, (i / 10) as u8);
            keeper.tick(&mut rtc, Instant::from_millis(i * 100));
        }
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 3));
        assert_eq!(keeper.soft.drift().applied_ms(), 15);
    }

    #[test]
    fn test_disagreeing_read_resyncs() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut rtc = MockRtc::new(start);
        let mut keeper = Timekeeper::new(TimeSourceKind::Hardware, start, Instant::from_millis(0), 0, 1);
        keeper.tick(&mut rtc, Instant::from_millis(100));

        rtc.time = t(2024, 3, 1, 12, 0, 10);
        keeper.tick(&mut rtc, Instant::from_millis(200));
        assert_eq!(keeper.soft.time(), Some(t(2024, 3, 1, 12, 0, 10)));

        // Soft clock now carries on from the new reading
        rtc.fail = true;
        keeper.tick(&mut rtc, Instant::from_millis(1200));
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 11));
    }

    #[test]
    fn test_hardware_failure_falls_back() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut rtc = MockRtc::new(start);
        let mut keeper = Timekeeper::new(TimeSourceKind::Hardware, start, Instant::from_millis(0), 0, 1);
        keeper.tick(&mut rtc, Instant::from_millis(0));

        rtc.fail = true;
        for i in 1..=3 {
            keeper.tick(&mut rtc, Instant::from_millis(i * 1000));
        }
        assert!(!keeper.source_ok());
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 3));

        rtc.fail = false;
        rtc.time = t(2024, 3, 1, 12, 0, 4);
        keeper.tick(&mut rtc, Instant::from_millis(4000));
        assert!(keeper.source_ok());
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 4));
    }

    #[test]
    fn test_spring_forward() {
        // 2024-03-31 is the last Sunday of March
        let start = t(2024, 3, 31, 1, 59, 59);
        let mut keeper = Timekeeper::new(TimeSourceKind::Millis, start, Instant::from_millis(0), 0, 1);
        keeper.set_dst(DstRule::Europe, false);

        keeper.tick(&mut crate::traits::NoTimeSource, Instant::from_millis(1000));
        assert_eq!(keeper.now(), t(2024, 3, 31, 3, 0, 0));
        assert!(keeper.dst_active());
    }

    #[test]
    fn test_fall_back_once() {
        // 2024-10-27 is the last Sunday of October
        let start = t(2024, 10, 27, 2, 59, 59);
        let mut keeper = Timekeeper::new(TimeSourceKind::Millis, start, Instant::from_millis(0), 0, 1);
        keeper.set_dst(DstRule::Europe, true);
        let mut rtc = crate::traits::NoTimeSource;

        keeper.tick(&mut rtc, Instant::from_millis(1000));
        assert_eq!(keeper.now(), t(2024, 10, 27, 2, 0, 0));
        assert!(!keeper.dst_active());

        // The repeated hour passes without a second shift
        keeper.tick(&mut rtc, Instant::from_millis(1000 + 3600 * 1000));
        assert_eq!(keeper.now(), t(2024, 10, 27, 3, 0, 0));
        assert!(!keeper.dst_active());
    }

    #[test]
    fn test_set_time_writes_rtc() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let mut rtc = MockRtc::new(start);
        let mut keeper = Timekeeper::new(TimeSourceKind::Hardware, start, Instant::from_millis(0), 0, 1);

        let target = t(2024, 3, 1, 6, 45, 0);
        assert_eq!(keeper.set_time(&mut rtc, target, Instant::from_millis(5)), Ok(()));
        assert_eq!(rtc.writes, 1);
        assert_eq!(keeper.now(), target);
    }

    #[test]
    fn test_counter_wrap() {
        let start = t(2024, 3, 1, 12, 0, 0);
        let origin = Instant::from_millis(u32::MAX - 499);
        let mut keeper = Timekeeper::new(TimeSourceKind::Millis, start, origin, 0, 1);
        keeper.tick(&mut crate::traits::NoTimeSource, Instant::from_millis(500));
        assert_eq!(keeper.now(), t(2024, 3, 1, 12, 0, 1));
    }
}
