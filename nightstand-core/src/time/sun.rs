//! Sunrise and sunset
//!
//! NOAA general solar position approximation evaluated at local noon.
//! Accurate to a couple of minutes at temperate latitudes, which is all a
//! four-digit display can show anyway.

use core::f32::consts::PI;

use libm::{acosf, cosf, sinf, tanf};
use serde::{Deserialize, Serialize};

use super::calendar::{date_to_day_count, days_in_year};

/// Zenith angle of the sun's upper limb at rise/set, with refraction (degrees)
const ZENITH_DEG: f32 = 90.833;

const MINUTES_PER_DAY: i32 = 1440;

/// Observer location
///
/// Stored in hundredths of a degree to keep the persisted block small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct Location {
    /// Latitude × 100, north positive
    pub lat_x100: i16,
    /// Longitude × 100, east positive
    pub lon_x100: i16,
    /// Standard-time offset from UTC in minutes
    pub utc_offset_min: i16,
}

impl Default for Location {
    fn default() -> Self {
        // Greenwich
        Self {
            lat_x100: 5148,
            lon_x100: 0,
            utc_offset_min: 0,
        }
    }
}

/// Sun event times as minutes after local midnight
///
/// `None` when the sun does not rise (polar night) or set (midnight sun).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SunTimes {
    pub rise: Option<u16>,
    pub set: Option<u16>,
}

/// Compute local sunrise and sunset for a date
///
/// `dst` adds one hour to both results.
pub fn sun_times(year: u16, month: u8, day: u8, location: &Location, dst: bool) -> SunTimes {
    let day_of_year = date_to_day_count(year, month, day) - date_to_day_count(year, 1, 1) + 1;
    let gamma = 2.0 * PI / f32::from(days_in_year(year)) * (day_of_year as f32 - 1.0);

    let eq_time_min = 229.18
        * (0.000_075 + 0.001_868 * cosf(gamma)
            - 0.032_077 * sinf(gamma)
            - 0.014_615 * cosf(2.0 * gamma)
            - 0.040_849 * sinf(2.0 * gamma));

    let declination = 0.006_918 - 0.399_912 * cosf(gamma) + 0.070_257 * sinf(gamma)
        - 0.006_758 * cosf(2.0 * gamma)
        + 0.000_907 * sinf(2.0 * gamma)
        - 0.002_697 * cosf(3.0 * gamma)
        + 0.001_48 * sinf(3.0 * gamma);

    let lat = f32::from(location.lat_x100) / 100.0 * PI / 180.0;
    let lon_deg = f32::from(location.lon_x100) / 100.0;

    let cos_ha = cosf(ZENITH_DEG * PI / 180.0) / (cosf(lat) * cosf(declination))
        - tanf(lat) * tanf(declination);
    if !(-1.0..=1.0).contains(&cos_ha) {
        // Above 1: polar night. Below -1: midnight sun.
        return SunTimes::default();
    }
    let ha_deg = acosf(cos_ha) * 180.0 / PI;

    let offset = i32::from(location.utc_offset_min) + if dst { 60 } else { 0 };
    let to_local = |utc_min: f32| {
        let local = utc_min as i32 + offset;
        local.rem_euclid(MINUTES_PER_DAY) as u16
    };

    SunTimes {
        rise: Some(to_local(720.0 - 4.0 * (lon_deg + ha_deg) - eq_time_min + 0.5)),
        set: Some(to_local(720.0 - 4.0 * (lon_deg - ha_deg) - eq_time_min + 0.5)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(actual: Option<u16>, expected: u16, tolerance: u16) -> bool {
        actual.is_some_and(|a| a.abs_diff(expected) <= tolerance)
    }

    #[test]
    fn test_new_york_summer_solstice() {
        let nyc = Location {
            lat_x100: 4071,
            lon_x100: -7401,
            utc_offset_min: -300,
        };
        let sun = sun_times(2024, 6, 21, &nyc, true);
        // 05:25 and 20:31 EDT
        assert!(near(sun.rise, 5 * 60 + 25, 5));
        assert!(near(sun.set, 20 * 60 + 31, 5));
    }

    #[test]
    fn test_equator_equinox() {
        let origin = Location {
            lat_x100: 0,
            lon_x100: 0,
            utc_offset_min: 0,
        };
        let sun = sun_times(2024, 3, 20, &origin, false);
        assert!(near(sun.rise, 6 * 60 + 4, 6));
        assert!(near(sun.set, 18 * 60 + 10, 6));
    }

    #[test]
    fn test_polar_day_and_night() {
        let svalbard = Location {
            lat_x100: 7822,
            lon_x100: 1565,
            utc_offset_min: 60,
        };
        assert_eq!(sun_times(2024, 6, 21, &svalbard, false), SunTimes::default());
        assert_eq!(sun_times(2024, 12, 21, &svalbard, false), SunTimes::default());
    }
}
