//! Validated calendar date and time of day

use super::calendar::{
    date_to_day_count, day_count_to_date, validate_date, weekday_of_day_count, CalendarError,
    Weekday,
};

/// Earliest supported year
pub const MIN_YEAR: u16 = 2000;

/// Latest supported year
pub const MAX_YEAR: u16 = 2099;

const SECONDS_PER_DAY: u32 = 86_400;

/// A wall-clock date and time
///
/// Always a valid calendar date: the only constructors validate, and
/// arithmetic goes through the day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Default for ClockTime {
    fn default() -> Self {
        Self {
            year: MIN_YEAR,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl ClockTime {
    /// Create a validated date-time
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CalendarError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear);
        }
        validate_date(year, month, day)?;
        if hour > 23 || minute > 59 || second > 59 {
            return Err(CalendarError::InvalidTime);
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Minutes since local midnight
    pub const fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Days since 2000-01-01
    pub fn day_count(&self) -> i32 {
        date_to_day_count(self.year, self.month, self.day)
    }

    pub fn weekday(&self) -> Weekday {
        weekday_of_day_count(self.day_count())
    }

    /// Seconds since 2000-01-01 00:00:00
    pub fn to_seconds(&self) -> u32 {
        // Day count is never negative for supported years
        self.day_count() as u32 * SECONDS_PER_DAY
            + u32::from(self.hour) * 3600
            + u32::from(self.minute) * 60
            + u32::from(self.second)
    }

    /// Inverse of [`ClockTime::to_seconds`]
    pub fn from_seconds(seconds: u32) -> Result<Self, CalendarError> {
        let days = seconds / SECONDS_PER_DAY;
        let rem = seconds % SECONDS_PER_DAY;
        let (year, month, day) = day_count_to_date(days as i32);
        Self::new(
            year,
            month,
            day,
            (rem / 3600) as u8,
            ((rem / 60) % 60) as u8,
            (rem % 60) as u8,
        )
    }

    /// Same date with a different time of day
    pub fn with_time(&self, hour: u8, minute: u8, second: u8) -> Result<Self, CalendarError> {
        Self::new(self.year, self.month, self.day, hour, minute, second)
    }

    /// Same time of day on a different date
    pub fn with_date(&self, year: u16, month: u8, day: u8) -> Result<Self, CalendarError> {
        Self::new(year, month, day, self.hour, self.minute, self.second)
    }

    /// Shift by a signed number of seconds
    ///
    /// Fails if the result leaves the supported year range.
    pub fn offset_seconds(&self, delta: i32) -> Result<Self, CalendarError> {
        let shifted = i64::from(self.to_seconds()) + i64::from(delta);
        if shifted < 0 || shifted > i64::from(u32::MAX) {
            return Err(CalendarError::InvalidYear);
        }
        Self::from_seconds(shifted as u32)
    }
}
