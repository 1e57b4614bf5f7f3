//! Timekeeping engine
//!
//! Calendar arithmetic, DST rules, sunrise/sunset, the drift-corrected
//! software clock and the [`Timekeeper`] that ties them together.

pub mod calendar;
pub mod clock_time;
pub mod drift;
pub mod dst;
pub mod instant;
pub mod keeper;
pub mod sun;

pub use calendar::{CalendarError, Weekday};
pub use clock_time::{ClockTime, MAX_YEAR, MIN_YEAR};
pub use drift::{DriftState, SoftClock};
pub use dst::{DstRule, DstStatus};
pub use instant::Instant;
pub use keeper::{TimeEvents, Timekeeper, TimeSourceKind};
pub use sun::{sun_times, Location, SunTimes};
