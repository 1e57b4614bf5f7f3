//! Calendar arithmetic
//!
//! Proleptic Gregorian calendar. Dates are converted to a day count
//! relative to 2000-01-01 (day 0, a Saturday) with a closed-form transform,
//! and everything else (weekday, anniversaries, DST boundaries) is derived
//! from that count.

/// Days between 1970-01-01 and 2000-01-01
const EPOCH_2000_FROM_UNIX: i32 = 10_957;

/// Days between 0000-03-01 and 1970-01-01
const UNIX_FROM_CIVIL: i32 = 719_468;

/// Days in a 400-year Gregorian cycle
const DAYS_PER_ERA: i32 = 146_097;

/// Errors from calendar validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarError {
    /// Year outside the supported range
    InvalidYear,
    /// Month not in 1-12
    InvalidMonth,
    /// Day not valid for the month
    InvalidDay,
    /// Hour, minute or second out of range
    InvalidTime,
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Weekday from a 0-based index (0 = Sunday), wrapping
    pub const fn from_index(index: u8) -> Self {
        match index % 7 {
            0 => Weekday::Sunday,
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            _ => Weekday::Saturday,
        }
    }

    /// 0-based index (0 = Sunday)
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Leap year: divisible by 4, except centuries not divisible by 400
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a month (0 for an invalid month)
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Number of days in a year
pub const fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Check that a date exists
pub fn validate_date(year: u16, month: u8, day: u8) -> Result<(), CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth);
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(CalendarError::InvalidDay);
    }
    Ok(())
}

/// Days since 2000-01-01 (negative before)
///
/// The caller is responsible for passing a valid date.
pub fn date_to_day_count(year: u16, month: u8, day: u8) -> i32 {
    let y = i32::from(year) - i32::from(month <= 2);
    let era = y.div_euclid(400);
    let year_of_era = y - era * 400;
    // March-based month so the leap day is the last day of the year
    let mp = (i32::from(month) + 9) % 12;
    let day_of_year = (153 * mp + 2) / 5 + i32::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - UNIX_FROM_CIVIL - EPOCH_2000_FROM_UNIX
}

/// Inverse of [`date_to_day_count`]
pub fn day_count_to_date(days: i32) -> (u16, u8, u8) {
    let z = days + EPOCH_2000_FROM_UNIX + UNIX_FROM_CIVIL;
    let era = z.div_euclid(DAYS_PER_ERA);
    let day_of_era = z - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i32::from(month <= 2);
    (year as u16, month as u8, day as u8)
}

/// Day of week for a date
pub fn day_of_week(year: u16, month: u8, day: u8) -> Weekday {
    weekday_of_day_count(date_to_day_count(year, month, day))
}

/// Day of week for a day count (day 0 is a Saturday)
pub fn weekday_of_day_count(days: i32) -> Weekday {
    Weekday::from_index((days + 6).rem_euclid(7) as u8)
}

/// Calendar day of the `nth` given weekday in a month
///
/// `nth` counts from the start of the month when positive (1 = first) and
/// from the end when negative (-1 = last). Returns `None` if that
/// occurrence does not exist (e.g. a fifth Sunday) or the month is invalid.
pub fn nth_weekday(year: u16, month: u8, weekday: Weekday, nth: i8) -> Option<u8> {
    let dim = days_in_month(year, month);
    if dim == 0 || nth == 0 {
        return None;
    }

    let target = i32::from(weekday.index());
    let day = if nth > 0 {
        let first = i32::from(day_of_week(year, month, 1).index());
        1 + (target - first).rem_euclid(7) + 7 * (i32::from(nth) - 1)
    } else {
        let last = i32::from(day_of_week(year, month, dim).index());
        i32::from(dim) - (last - target).rem_euclid(7) - 7 * (-i32::from(nth) - 1)
    };

    if day >= 1 && day <= i32::from(dim) {
        Some(day as u8)
    } else {
        None
    }
}

/// Days between a date and an annual target date
///
/// With `count_up == false`, returns the days until the next occurrence of
/// `target_month`/`target_day` (0 on the day itself). With
/// `count_up == true`, returns the days since the most recent occurrence.
/// A February 29 target falls on February 28 in common years.
pub fn date_comp(
    year: u16,
    month: u8,
    day: u8,
    target_month: u8,
    target_day: u8,
    count_up: bool,
) -> i32 {
    let today = date_to_day_count(year, month, day);
    let occurrence = |y: u16| {
        let d = target_day.min(days_in_month(y, target_month)).max(1);
        date_to_day_count(y, target_month, d)
    };

    let this_year = occurrence(year);
    if count_up {
        if this_year <= today {
            today - this_year
        } else {
            today - occurrence(year.saturating_sub(1))
        }
    } else if this_year >= today {
        this_year - today
    } else {
        occurrence(year.saturating_add(1)) - today
    }
}

/// Is a minute-of-day inside `[start, end)`?
///
/// Ranges wrap past midnight when `start > end`. An empty range
/// (`start == end`) contains nothing.
pub fn is_time_in_range(start: u16, end: u16, test: u16) -> bool {
    if start == end {
        false
    } else if start < end {
        test >= start && test < end
    } else {
        test >= start || test < end
    }
}

/// Is a weekday inside the inclusive range `start..=end`?
///
/// Ranges wrap past Saturday when `start > end` (e.g. Friday..=Monday).
pub fn is_day_in_range(start: Weekday, end: Weekday, test: Weekday) -> bool {
    if start <= end {
        test >= start && test <= end
    } else {
        test >= start || test <= end
    }
}
