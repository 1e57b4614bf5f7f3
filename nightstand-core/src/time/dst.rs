//! Daylight saving time rules
//!
//! Each rule is a pair of "nth weekday of month" boundaries with local
//! transition hours. Southern-hemisphere rules start late in the year and
//! end early in the next, so their DST interval wraps the new year.

use serde::{Deserialize, Serialize};

use super::calendar::{date_to_day_count, nth_weekday, Weekday};

/// Regional DST rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum DstRule {
    /// No automatic adjustment
    #[default]
    Off,
    /// Second Sunday of March to first Sunday of November, 02:00
    NorthAmerica,
    /// Last Sunday of March to last Sunday of October (central European hours)
    Europe,
    /// First Sunday of October to first Sunday of April
    AustraliaSouth,
    /// Last Sunday of September to first Sunday of April
    NewZealand,
}

/// Transition boundaries for one year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DstBoundaries {
    /// Day count of the spring-forward date
    pub start: i32,
    /// Day count of the fall-back date
    pub end: i32,
    /// Standard-time hour at which clocks spring forward
    pub start_hour: u8,
    /// Daylight-time hour at which clocks fall back
    pub end_hour: u8,
}

/// DST answer for a date and hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DstStatus {
    /// Daylight time is in effect
    pub dst: bool,
    /// The wall-clock hour occurs twice on the fall-back date
    pub ambiguous: bool,
}

/// Rule shape: (month, nth Sunday) for start and end, plus local hours
struct RuleShape {
    start: (u8, i8),
    end: (u8, i8),
    start_hour: u8,
    end_hour: u8,
}

impl DstRule {
    fn shape(self) -> Option<RuleShape> {
        match self {
            DstRule::Off => None,
            DstRule::NorthAmerica => Some(RuleShape {
                start: (3, 2),
                end: (11, 1),
                start_hour: 2,
                end_hour: 2,
            }),
            DstRule::Europe => Some(RuleShape {
                start: (3, -1),
                end: (10, -1),
                start_hour: 2,
                end_hour: 3,
            }),
            DstRule::AustraliaSouth => Some(RuleShape {
                start: (10, 1),
                end: (4, 1),
                start_hour: 2,
                end_hour: 3,
            }),
            DstRule::NewZealand => Some(RuleShape {
                start: (9, -1),
                end: (4, 1),
                start_hour: 2,
                end_hour: 3,
            }),
        }
    }

    /// Transition dates for a year, or `None` for [`DstRule::Off`]
    pub fn boundaries(self, year: u16) -> Option<DstBoundaries> {
        let shape = self.shape()?;
        let day_of = |(month, nth): (u8, i8)| {
            let day = nth_weekday(year, month, Weekday::Sunday, nth)?;
            Some(date_to_day_count(year, month, day))
        };
        Some(DstBoundaries {
            start: day_of(shape.start)?,
            end: day_of(shape.end)?,
            start_hour: shape.start_hour,
            end_hour: shape.end_hour,
        })
    }

    /// Is DST in effect on a date?
    ///
    /// The spring-forward date counts as DST and the fall-back date as
    /// standard time.
    pub fn is_dst(self, year: u16, month: u8, day: u8) -> bool {
        let Some(b) = self.boundaries(year) else {
            return false;
        };
        in_dst_interval(&b, date_to_day_count(year, month, day))
    }

    /// Is DST in effect at a local date and hour?
    ///
    /// On the fall-back date the hour before `end_hour` is reported as
    /// ambiguous: it is lived twice, once in each regime.
    pub fn is_dst_by_hour(self, year: u16, month: u8, day: u8, hour: u8) -> DstStatus {
        let Some(b) = self.boundaries(year) else {
            return DstStatus {
                dst: false,
                ambiguous: false,
            };
        };
        let today = date_to_day_count(year, month, day);

        if today == b.start {
            DstStatus {
                dst: hour >= b.start_hour,
                ambiguous: false,
            }
        } else if today == b.end {
            DstStatus {
                dst: hour < b.end_hour,
                ambiguous: hour + 1 == b.end_hour,
            }
        } else {
            DstStatus {
                dst: in_dst_interval(&b, today),
                ambiguous: false,
            }
        }
    }
}

fn in_dst_interval(b: &DstBoundaries, day: i32) -> bool {
    if b.start <= b.end {
        day >= b.start && day < b.end
    } else {
        // Southern hemisphere: wraps the new year
        day >= b.start || day < b.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_america_2024() {
        let rule = DstRule::NorthAmerica;
        assert!(!rule.is_dst(2024, 3, 9));
        assert!(rule.is_dst(2024, 3, 10));
        assert!(rule.is_dst(2024, 7, 4));
        assert!(rule.is_dst(2024, 11, 2));
        assert!(!rule.is_dst(2024, 11, 3));
        assert!(!rule.is_dst(2024, 12, 25));
    }

    #[test]
    fn test_spring_forward_hour() {
        let rule = DstRule::NorthAmerica;
        assert!(!rule.is_dst_by_hour(2024, 3, 10, 1).dst);
        assert!(rule.is_dst_by_hour(2024, 3, 10, 2).dst);
        assert!(rule.is_dst_by_hour(2024, 3, 10, 3).dst);
    }

    #[test]
    fn test_fall_back_ambiguous_hour() {
        let rule = DstRule::NorthAmerica;
        let zero = rule.is_dst_by_hour(2024, 11, 3, 0);
        assert!(zero.dst && !zero.ambiguous);
        let one = rule.is_dst_by_hour(2024, 11, 3, 1);
        assert!(one.ambiguous);
        let two = rule.is_dst_by_hour(2024, 11, 3, 2);
        assert!(!two.dst && !two.ambiguous);
    }

    #[test]
    fn test_europe_ambiguous_hour_is_two() {
        let rule = DstRule::Europe;
        assert!(rule.is_dst_by_hour(2024, 10, 27, 2).ambiguous);
        assert!(!rule.is_dst_by_hour(2024, 10, 27, 3).dst);
    }

    #[test]
    fn test_southern_hemisphere_wraps_year() {
        let rule = DstRule::AustraliaSouth;
        assert!(rule.is_dst(2024, 1, 15));
        assert!(!rule.is_dst(2024, 6, 15));
        assert!(rule.is_dst(2024, 12, 15));
        // First Sunday of April 2024 is the 7th
        assert!(rule.is_dst(2024, 4, 6));
        assert!(!rule.is_dst(2024, 4, 7));
    }

    #[test]
    fn test_off_is_never_dst() {
        assert!(!DstRule::Off.is_dst(2024, 7, 1));
        assert!(DstRule::Off.boundaries(2024).is_none());
    }
}
