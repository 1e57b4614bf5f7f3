//! Real-time clock trait

use crate::time::ClockTime;

/// Errors from the time source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSourceError {
    /// The clock chip did not answer or returned garbage
    SourceUnavailable,
}

/// Trait for a hardware real-time clock
///
/// Implementations should return `SourceUnavailable` for bus errors and
/// for register contents that do not form a valid date.
pub trait TimeSource {
    /// Read the current local date and time
    fn read_time(&mut self) -> Result<ClockTime, TimeSourceError>;

    /// Set the clock (after a user edit or DST change)
    fn write_time(&mut self, time: ClockTime) -> Result<(), TimeSourceError>;
}

/// Placeholder for boards without an RTC
///
/// Every read fails, so the timekeeper runs from the software clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTimeSource;

impl TimeSource for NoTimeSource {
    fn read_time(&mut self) -> Result<ClockTime, TimeSourceError> {
        Err(TimeSourceError::SourceUnavailable)
    }

    fn write_time(&mut self, _time: ClockTime) -> Result<(), TimeSourceError> {
        Ok(())
    }
}
