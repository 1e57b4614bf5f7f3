//! User-selectable presentation options

use serde::{Deserialize, Serialize};

use crate::time::calendar::is_time_in_range;

/// Hour presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum TimeFormat {
    H12,
    #[default]
    H24,
}

impl TimeFormat {
    /// Hour as shown on the display
    pub fn display_hour(self, hour: u8) -> u8 {
        match self {
            TimeFormat::H12 => (hour + 11) % 12 + 1,
            TimeFormat::H24 => hour,
        }
    }
}

/// Order of date components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

impl DateFormat {
    /// Whether the day is shown before the month
    pub fn day_first(self) -> bool {
        self == DateFormat::DayMonthYear
    }
}

/// Brightness source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum DimmingMode {
    /// Always full brightness
    Fixed,
    /// Follow the ambient light sensor
    #[default]
    Ambient,
}

/// Nightly dim period (minutes past midnight, wraps)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct NightDim {
    pub enabled: bool,
    pub start_min: u16,
    pub end_min: u16,
}

impl Default for NightDim {
    fn default() -> Self {
        Self {
            enabled: false,
            start_min: 22 * 60,
            end_min: 6 * 60,
        }
    }
}

impl NightDim {
    pub fn is_active(&self, minute_of_day: u16) -> bool {
        self.enabled && is_time_in_range(self.start_min, self.end_min, minute_of_day)
    }
}
