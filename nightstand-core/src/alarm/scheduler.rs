//! Alarm configuration and minute-edge evaluation
//!
//! The scheduler is polled every tick but only evaluates once per
//! (day, minute-of-day) key. Auto-skip is checked before the one-shot
//! skip flag and an auto-skipped day leaves the flag set, so a manual skip
//! always applies to the next occurrence that would actually ring.

use serde::{Deserialize, Serialize};

use crate::signal::SignalPattern;
use crate::time::calendar::is_day_in_range;
use crate::time::{ClockTime, Weekday};

/// Alarm enable state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum AlarmState {
    #[default]
    Off,
    On,
    /// On, but the next occurrence is skipped
    Skip,
}

impl AlarmState {
    /// Cycle On -> Skip -> Off -> On (or the reverse for negative `dir`)
    pub fn cycled(self, dir: i8) -> Self {
        match (self, dir >= 0) {
            (AlarmState::On, true) => AlarmState::Skip,
            (AlarmState::Skip, true) => AlarmState::Off,
            (AlarmState::Off, true) => AlarmState::On,
            (AlarmState::On, false) => AlarmState::Off,
            (AlarmState::Off, false) => AlarmState::Skip,
            (AlarmState::Skip, false) => AlarmState::On,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != AlarmState::Off
    }
}

/// Inclusive (month, day) range that may wrap the new year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct DateRange {
    pub start: (u8, u8),
    pub end: (u8, u8),
}

impl DateRange {
    pub fn contains(&self, month: u8, day: u8) -> bool {
        let key = (month, day);
        if self.start <= self.end {
            self.start <= key && key <= self.end
        } else {
            key >= self.start || key <= self.end
        }
    }
}

/// Rules that suppress an occurrence without touching the alarm settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct AutoSkip {
    /// Ring only on these days (inclusive, wrapping), e.g. Monday..Friday
    pub workdays: Option<(Weekday, Weekday)>,
    /// Never ring within this date range (holidays)
    pub away: Option<DateRange>,
}

impl AutoSkip {
    pub fn excludes(&self, time: &ClockTime) -> bool {
        if let Some((start, end)) = self.workdays {
            if !is_day_in_range(start, end, time.weekday()) {
                return true;
            }
        }
        self.away
            .is_some_and(|away| away.contains(time.month(), time.day()))
    }
}

/// Persisted alarm settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct AlarmConfig {
    pub hour: u8,
    pub minute: u8,
    pub state: AlarmState,
    pub pattern: SignalPattern,
    pub auto_skip: AutoSkip,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            hour: 7,
            minute: 0,
            state: AlarmState::Off,
            pattern: SignalPattern::Fibonacci,
            auto_skip: AutoSkip::default(),
        }
    }
}

impl AlarmConfig {
    /// Alarm time as minutes past midnight
    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// Cycle the enable state
    pub fn switch_alarm_state(&mut self, dir: i8) -> AlarmState {
        self.state = self.state.cycled(dir);
        self.state
    }

    pub fn set_alarm_state(&mut self, state: AlarmState) {
        self.state = state;
    }
}

/// Why an occurrence did not ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// Auto-skip rule excluded the day
    Auto,
    /// One-shot skip flag (now cleared)
    Manual,
}

/// Result of evaluating a matching minute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmOutcome {
    Fire,
    Skipped(SkipReason),
}

/// Edge-triggered alarm evaluator
#[derive(Debug, Clone, Default)]
pub struct AlarmScheduler {
    last_key: Option<(i32, u16)>,
}

impl AlarmScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the alarm at `now`
    ///
    /// Returns `None` unless this is the first call in the alarm's minute
    /// and the alarm is enabled. A manual skip is consumed here.
    pub fn check(
        &mut self,
        config: &mut AlarmConfig,
        now: &ClockTime,
        auto_skip_enabled: bool,
    ) -> Option<AlarmOutcome> {
        let key = (now.day_count(), now.minute_of_day());
        if self.last_key == Some(key) {
            return None;
        }
        self.last_key = Some(key);

        if key.1 != config.minute_of_day() || !config.state.is_enabled() {
            return None;
        }

        if auto_skip_enabled && config.auto_skip.excludes(now) {
            info!("Alarm auto-skipped");
            return Some(AlarmOutcome::Skipped(SkipReason::Auto));
        }

        if config.state == AlarmState::Skip {
            info!("Alarm skipped once");
            config.state = AlarmState::On;
            return Some(AlarmOutcome::Skipped(SkipReason::Manual));
        }

        info!("Alarm fire {}:{}", config.hour, config.minute);
        Some(AlarmOutcome::Fire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8) -> ClockTime {
        ClockTime::new(y, mo, d, h, mi, s).unwrap()
    }

    fn alarm_at_7() -> AlarmConfig {
        AlarmConfig {
            state: AlarmState::On,
            ..Default::default()
        }
    }

    #[test]
    fn test_fires_once_per_minute() {
        let mut scheduler = AlarmScheduler::new();
        let mut alarm = alarm_at_7();

        assert_eq!(scheduler.check(&mut alarm, &t(2024, 5, 6, 6, 59, 59), false), None);
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 0, 0), false),
            Some(AlarmOutcome::Fire)
        );
        for s in 0..60 {
            assert_eq!(scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 0, s), false), None);
        }
        assert_eq!(scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 1, 0), false), None);
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 7, 7, 0, 0), false),
            Some(AlarmOutcome::Fire)
        );
    }

    #[test]
    fn test_off_never_fires() {
        let mut scheduler = AlarmScheduler::new();
        let mut alarm = AlarmConfig::default();
        assert_eq!(scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 0, 0), false), None);
    }

    #[test]
    fn test_skip_consumed_once() {
        let mut scheduler = AlarmScheduler::new();
        let mut alarm = alarm_at_7();
        alarm.set_alarm_state(AlarmState::Skip);

        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 0, 0), false),
            Some(AlarmOutcome::Skipped(SkipReason::Manual))
        );
        assert_eq!(alarm.state, AlarmState::On);
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 7, 7, 0, 0), false),
            Some(AlarmOutcome::Fire)
        );
    }

    #[test]
    fn test_auto_skip_precedes_manual_skip() {
        let mut scheduler = AlarmScheduler::new();
        let mut alarm = alarm_at_7();
        alarm.auto_skip.workdays = Some((Weekday::Monday, Weekday::Friday));
        alarm.set_alarm_state(AlarmState::Skip);

        // 2024-05-04 is a Saturday: auto-skipped, manual flag kept
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 4, 7, 0, 0), true),
            Some(AlarmOutcome::Skipped(SkipReason::Auto))
        );
        assert_eq!(alarm.state, AlarmState::Skip);

        // Monday uses up the manual skip
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 6, 7, 0, 0), true),
            Some(AlarmOutcome::Skipped(SkipReason::Manual))
        );
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 7, 7, 0, 0), true),
            Some(AlarmOutcome::Fire)
        );
    }

    #[test]
    fn test_auto_skip_ignored_when_disabled() {
        let mut scheduler = AlarmScheduler::new();
        let mut alarm = alarm_at_7();
        alarm.auto_skip.workdays = Some((Weekday::Monday, Weekday::Friday));
        assert_eq!(
            scheduler.check(&mut alarm, &t(2024, 5, 4, 7, 0, 0), false),
            Some(AlarmOutcome::Fire)
        );
    }

    #[test]
    fn test_away_range_wraps_year() {
        let away = DateRange {
            start: (12, 20),
            end: (1, 5),
        };
        assert!(away.contains(12, 25));
        assert!(away.contains(1, 5));
        assert!(!away.contains(1, 6));
        assert!(!away.contains(6, 1));
    }

    #[test]
    fn test_state_cycle() {
        let mut alarm = AlarmConfig::default();
        assert_eq!(alarm.switch_alarm_state(1), AlarmState::On);
        assert_eq!(alarm.switch_alarm_state(1), AlarmState::Skip);
        assert_eq!(alarm.switch_alarm_state(1), AlarmState::Off);
        assert_eq!(alarm.switch_alarm_state(-1), AlarmState::Skip);
    }
}
