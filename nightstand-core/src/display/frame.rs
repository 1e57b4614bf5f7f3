//! Display frame composition
//!
//! [`compose`] turns a snapshot of the clock state into a [`DisplayFrame`]:
//! one optional digit per position plus blink, colon and brightness
//! information. It is pure; the controller hands the frame to the
//! [`DisplayDriver`](crate::traits::DisplayDriver).

use super::brightness::brightness;
use super::format::{DateFormat, DimmingMode, NightDim};
use crate::alarm::AlarmState;
use crate::config::{DisplayConfig, UserSettings, MAX_DISPLAY_SIZE};
use crate::state::{DatePage, EditKind, EditView, Function, Mode};
use crate::time::calendar::date_comp;
use crate::time::{ClockTime, SunTimes};

/// Digit positions in a frame
pub const MAX_DIGITS: usize = MAX_DISPLAY_SIZE as usize;

/// One rendered display state
///
/// Position 0 is the leftmost digit. Positions at or beyond `size` are
/// always blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    /// Digit values 0-9, `None` for a blank position
    pub digits: [Option<u8>; MAX_DIGITS],
    /// Fitted digit count (4 or 6)
    pub size: u8,
    /// Bit n set = position n blinks
    pub blink_mask: u8,
    /// Brightness 0-15
    pub brightness: u8,
    /// Separators lit (time-like pages)
    pub colons: bool,
    /// Minus sign lit ahead of the leftmost shown digit
    pub minus: bool,
}

impl DisplayFrame {
    /// An all-blank frame
    pub fn blank(size: u8, brightness: u8) -> Self {
        Self {
            digits: [None; MAX_DIGITS],
            size: size.min(MAX_DISPLAY_SIZE),
            blink_mask: 0,
            brightness,
            colons: false,
            minus: false,
        }
    }

    pub fn digit(&self, pos: usize) -> Option<u8> {
        if pos < usize::from(self.size) {
            self.digits[pos]
        } else {
            None
        }
    }

    pub fn blinks(&self, pos: usize) -> bool {
        pos < MAX_DIGITS && self.blink_mask & (1 << pos) != 0
    }

    fn set_digit(&mut self, pos: usize, digit: Option<u8>) {
        if pos < usize::from(self.size) {
            self.digits[pos] = digit;
        }
    }

    /// Zero-padded number in `width` positions starting at `start`
    fn set_digits(&mut self, start: usize, width: usize, value: u32) {
        let mut v = value;
        for pos in (start..start + width).rev() {
            self.set_digit(pos, Some((v % 10) as u8));
            v /= 10;
        }
    }

    fn set_pair(&mut self, pos: usize, value: u8, blank_leading_zero: bool) {
        self.set_digits(pos, 2, u32::from(value));
        if blank_leading_zero && value < 10 {
            self.set_digit(pos, None);
        }
    }

    /// Right-aligned number with leading zeros blanked
    fn set_right(&mut self, value: u32, min_digits: usize) {
        let size = usize::from(self.size);
        let mut v = value;
        for i in 0..size {
            if v == 0 && i >= min_digits {
                break;
            }
            self.digits[size - 1 - i] = Some((v % 10) as u8);
            v /= 10;
        }
    }

    fn blink(&mut self, start: usize, width: usize) {
        for pos in start..(start + width).min(MAX_DIGITS) {
            self.blink_mask |= 1 << pos;
        }
    }
}

/// Everything a frame is built from
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub mode: Mode,
    /// Function menu candidate, if the menu is open
    pub menu: Option<Function>,
    pub edit: Option<EditView>,
    pub time: ClockTime,
    pub settings: &'a UserSettings,
    pub sun: SunTimes,
    /// Timer value to show (the preset while idle)
    pub timer_ms: u32,
    pub temperature_x10: Option<i16>,
    pub lux: Option<u16>,
    pub config: &'a DisplayConfig,
    /// Dimming hardware fitted
    pub dimming: bool,
}

/// Build the frame for the current state
pub fn compose(inputs: &FrameInputs<'_>) -> DisplayFrame {
    let settings = inputs.settings;
    let (mode, night) = if inputs.dimming {
        (settings.dimming, settings.night_dim)
    } else {
        (DimmingMode::Fixed, NightDim::default())
    };
    let level = brightness(
        inputs.config,
        mode,
        &night,
        inputs.lux,
        inputs.time.minute_of_day(),
    );
    let mut frame = DisplayFrame::blank(inputs.config.size, level);

    if let Some(function) = inputs.menu {
        frame.set_digit(0, Some(function.number()));
        frame.blink(0, 1);
        return frame;
    }

    match inputs.edit {
        Some(view) => compose_edit(&mut frame, &view, settings),
        None => compose_page(&mut frame, inputs),
    }
    frame
}

fn compose_page(frame: &mut DisplayFrame, inputs: &FrameInputs<'_>) {
    let settings = inputs.settings;
    let t = &inputs.time;

    match inputs.mode {
        Mode::Time => {
            put_clock(frame, settings, t.hour(), t.minute());
            frame.set_pair(4, t.second(), false);
        }
        Mode::Date(DatePage::Date) => put_date(frame, settings, t.year(), t.month(), t.day()),
        Mode::Date(DatePage::Counter) => {
            let c = &settings.counter;
            let days = date_comp(t.year(), t.month(), t.day(), c.month, c.day, c.count_up);
            frame.set_right(days.unsigned_abs(), 1);
        }
        Mode::Date(DatePage::Sunrise) => put_minutes(frame, settings, inputs.sun.rise),
        Mode::Date(DatePage::Sunset) => put_minutes(frame, settings, inputs.sun.set),
        Mode::Alarm => {
            let alarm = &settings.alarm;
            put_clock(frame, settings, alarm.hour, alarm.minute);
            if frame.size >= MAX_DISPLAY_SIZE {
                let indicator = match alarm.state {
                    AlarmState::Off => 0,
                    AlarmState::On => 1,
                    AlarmState::Skip => 2,
                };
                frame.set_digit(usize::from(frame.size) - 1, Some(indicator));
            } else {
                // No spare digit: colons show armed, a blinking minute shows skip
                frame.colons = alarm.state != AlarmState::Off;
                if alarm.state == AlarmState::Skip {
                    frame.blink(2, 2);
                }
            }
        }
        Mode::Timer => put_timer(frame, inputs.timer_ms),
        Mode::Temperature => {
            if let Some(x10) = inputs.temperature_x10 {
                frame.set_right(u32::from(x10.unsigned_abs()), 2);
                frame.minus = x10 < 0;
            }
        }
        Mode::TubeTest => {
            let digit = t.second() % 10;
            for pos in 0..MAX_DIGITS {
                frame.set_digit(pos, Some(digit));
            }
        }
    }
}

fn put_clock(frame: &mut DisplayFrame, settings: &UserSettings, hour: u8, minute: u8) {
    frame.colons = true;
    frame.set_pair(
        0,
        settings.time_format.display_hour(hour),
        !settings.leading_zero,
    );
    frame.set_pair(2, minute, false);
}

fn put_minutes(frame: &mut DisplayFrame, settings: &UserSettings, minutes: Option<u16>) {
    if let Some(m) = minutes {
        put_clock(frame, settings, (m / 60) as u8, (m % 60) as u8);
    }
}

fn put_date(frame: &mut DisplayFrame, settings: &UserSettings, year: u16, month: u8, day: u8) {
    let yy = (year % 100) as u8;
    let pairs = match settings.date_format {
        DateFormat::MonthDayYear => [month, day, yy],
        DateFormat::DayMonthYear => [day, month, yy],
        DateFormat::YearMonthDay => [yy, month, day],
    };
    // A 4-digit display has no room for the year
    let shown: &[u8] = if frame.size >= MAX_DISPLAY_SIZE {
        &pairs
    } else if settings.date_format == DateFormat::YearMonthDay {
        &pairs[1..]
    } else {
        &pairs[..2]
    };

    for (i, value) in shown.iter().enumerate() {
        frame.set_pair(i * 2, *value, false);
    }
}

fn put_timer(frame: &mut DisplayFrame, ms: u32) {
    let total = ms / 1000;
    let hours = (total / 3600) as u8;
    let minutes = (total / 60 % 60) as u8;
    let seconds = (total % 60) as u8;
    frame.colons = true;

    if frame.size >= MAX_DISPLAY_SIZE {
        if hours > 0 {
            frame.set_pair(0, hours, true);
        }
        frame.set_pair(2, minutes, false);
        frame.set_pair(4, seconds, false);
    } else if hours > 0 {
        frame.set_pair(0, hours, true);
        frame.set_pair(2, minutes, false);
    } else {
        frame.set_pair(0, minutes, false);
        frame.set_pair(2, seconds, false);
    }
}

/// Edit pages always show hours in 24 h form so AM and PM stay distinct
fn compose_edit(frame: &mut DisplayFrame, view: &EditView, settings: &UserSettings) {
    let v = view.values.map(|x| x.max(0) as u32);
    let index = view.index;

    match view.kind {
        EditKind::Time | EditKind::Alarm => {
            frame.colons = true;
            frame.set_pair(0, v[0] as u8, false);
            frame.set_pair(2, v[1] as u8, false);
            frame.blink(index * 2, 2);
        }
        EditKind::Date if index == 0 => {
            frame.set_digits(0, 4, v[0]);
            frame.blink(0, 4);
        }
        EditKind::Date => put_month_day(frame, settings, v[1], v[2], index == 1),
        EditKind::Counter => put_month_day(frame, settings, v[0], v[1], index == 0),
        EditKind::Timer => {
            frame.colons = true;
            if frame.size >= MAX_DISPLAY_SIZE {
                frame.set_digits(0, 2, v[0]);
                frame.set_digits(2, 2, v[1]);
                frame.set_digits(4, 2, v[2]);
                frame.blink(index * 2, 2);
            } else if index == 2 {
                frame.set_digits(0, 2, v[1]);
                frame.set_digits(2, 2, v[2]);
                frame.blink(2, 2);
            } else {
                frame.set_digits(0, 2, v[0]);
                frame.set_digits(2, 2, v[1]);
                frame.blink(index * 2, 2);
            }
        }
    }
}

fn put_month_day(
    frame: &mut DisplayFrame,
    settings: &UserSettings,
    month: u32,
    day: u32,
    editing_month: bool,
) {
    let day_first = settings.date_format.day_first();
    let (month_pos, day_pos) = if day_first { (2, 0) } else { (0, 2) };
    frame.set_digits(month_pos, 2, month);
    frame.set_digits(day_pos, 2, day);
    frame.blink(if editing_month { month_pos } else { day_pos }, 2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TimeFormat;

    fn t(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8) -> ClockTime {
        ClockTime::new(y, mo, d, h, mi, s).unwrap()
    }

    fn inputs<'a>(
        mode: Mode,
        time: ClockTime,
        settings: &'a UserSettings,
        config: &'a DisplayConfig,
    ) -> FrameInputs<'a> {
        FrameInputs {
            mode,
            menu: None,
            edit: None,
            time,
            settings,
            sun: SunTimes::default(),
            timer_ms: 0,
            temperature_x10: None,
            lux: None,
            config,
            dimming: true,
        }
    }

    fn digits(frame: &DisplayFrame) -> [Option<u8>; MAX_DIGITS] {
        frame.digits
    }

    #[test]
    fn test_time_page() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let frame = compose(&inputs(Mode::Time, t(2024, 1, 1, 7, 5, 9), &settings, &config));
        assert_eq!(digits(&frame), [Some(0), Some(7), Some(0), Some(5), Some(0), Some(9)]);
        assert!(frame.colons);
        assert_eq!(frame.blink_mask, 0);
    }

    #[test]
    fn test_twelve_hour_without_leading_zero() {
        let settings = UserSettings {
            time_format: TimeFormat::H12,
            leading_zero: false,
            ..Default::default()
        };
        let config = DisplayConfig::default();
        let frame = compose(&inputs(Mode::Time, t(2024, 1, 1, 13, 5, 0), &settings, &config));
        assert_eq!(frame.digits[0], None);
        assert_eq!(frame.digits[1], Some(1));

        let frame = compose(&inputs(Mode::Time, t(2024, 1, 1, 0, 5, 0), &settings, &config));
        assert_eq!(frame.digits[0], Some(1));
        assert_eq!(frame.digits[1], Some(2));
    }

    #[test]
    fn test_date_formats() {
        let config = DisplayConfig::default();
        let time = t(2024, 2, 10, 12, 0, 0);
        let page = Mode::Date(DatePage::Date);

        let settings = UserSettings::default();
        let frame = compose(&inputs(page, time, &settings, &config));
        assert_eq!(digits(&frame), [Some(0), Some(2), Some(1), Some(0), Some(2), Some(4)]);

        let settings = UserSettings {
            date_format: DateFormat::DayMonthYear,
            ..Default::default()
        };
        let frame = compose(&inputs(page, time, &settings, &config));
        assert_eq!(digits(&frame), [Some(1), Some(0), Some(0), Some(2), Some(2), Some(4)]);

        let small = DisplayConfig {
            size: 4,
            ..Default::default()
        };
        let frame = compose(&inputs(page, time, &settings, &small));
        assert_eq!(digits(&frame), [Some(1), Some(0), Some(0), Some(2), None, None]);
    }

    #[test]
    fn test_counter_page() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let frame = compose(&inputs(
            Mode::Date(DatePage::Counter),
            t(2024, 12, 20, 12, 0, 0),
            &settings,
            &config,
        ));
        assert_eq!(digits(&frame), [None, None, None, None, None, Some(5)]);
    }

    #[test]
    fn test_sunrise_missing_is_blank() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Date(DatePage::Sunrise), t(2024, 6, 21, 12, 0, 0), &settings, &config);
        let frame = compose(&i);
        assert_eq!(digits(&frame), [None; MAX_DIGITS]);

        i.sun.rise = Some(5 * 60 + 42);
        let frame = compose(&i);
        assert_eq!(&frame.digits[..4], &[Some(0), Some(5), Some(4), Some(2)]);
    }

    #[test]
    fn test_alarm_page_shows_state() {
        let mut settings = UserSettings::default();
        settings.alarm.hour = 7;
        settings.alarm.minute = 30;
        settings.alarm.state = AlarmState::On;
        let config = DisplayConfig::default();
        let frame = compose(&inputs(Mode::Alarm, t(2024, 1, 1, 0, 0, 0), &settings, &config));
        assert_eq!(digits(&frame), [Some(0), Some(7), Some(3), Some(0), None, Some(1)]);
    }

    #[test]
    fn test_alarm_state_on_four_digits() {
        let mut settings = UserSettings::default();
        settings.alarm.hour = 7;
        settings.alarm.minute = 30;
        let config = DisplayConfig {
            size: 4,
            ..Default::default()
        };
        let mut frame_for = |state| {
            settings.alarm.state = state;
            compose(&inputs(Mode::Alarm, t(2024, 1, 1, 0, 0, 0), &settings, &config))
        };
        let off = frame_for(AlarmState::Off);
        let on = frame_for(AlarmState::On);
        let skip = frame_for(AlarmState::Skip);

        assert_eq!(&on.digits[..4], &[Some(0), Some(7), Some(3), Some(0)]);
        assert_ne!(off, on);
        assert_ne!(on, skip);
        assert_ne!(off, skip);
        assert!(!off.colons);
        assert!(on.colons && on.blink_mask == 0);
        assert!(skip.blinks(2) && skip.blinks(3));
    }

    #[test]
    fn test_timer_page() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Timer, t(2024, 1, 1, 0, 0, 0), &settings, &config);
        i.timer_ms = 3725 * 1000;
        let frame = compose(&i);
        assert_eq!(digits(&frame), [None, Some(1), Some(0), Some(2), Some(0), Some(5)]);

        let small = DisplayConfig {
            size: 4,
            ..Default::default()
        };
        i.config = &small;
        i.timer_ms = 125 * 1000;
        let frame = compose(&i);
        assert_eq!(&frame.digits[..4], &[Some(0), Some(2), Some(0), Some(5)]);
    }

    #[test]
    fn test_temperature_page() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Temperature, t(2024, 1, 1, 0, 0, 0), &settings, &config);
        i.temperature_x10 = Some(-53);
        let below = compose(&i);
        assert_eq!(digits(&below), [None, None, None, None, Some(5), Some(3)]);
        assert!(below.minus);

        i.temperature_x10 = Some(53);
        let above = compose(&i);
        assert!(!above.minus);
        assert_ne!(below, above);

        i.temperature_x10 = Some(4);
        let frame = compose(&i);
        assert_eq!(&frame.digits[4..], &[Some(0), Some(4)]);
    }

    #[test]
    fn test_tube_test() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let frame = compose(&inputs(Mode::TubeTest, t(2024, 1, 1, 0, 0, 37), &settings, &config));
        assert_eq!(digits(&frame), [Some(7); MAX_DIGITS]);
    }

    #[test]
    fn test_menu_shows_number() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Time, t(2024, 1, 1, 0, 0, 0), &settings, &config);
        i.menu = Some(Function::Alarm);
        let frame = compose(&i);
        assert_eq!(frame.digits[0], Some(3));
        assert!(frame.blinks(0));
        assert_eq!(frame.digits[1], None);
    }

    #[test]
    fn test_edit_blinks_field() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Time, t(2024, 1, 1, 0, 0, 0), &settings, &config);
        i.edit = Some(EditView {
            kind: EditKind::Time,
            index: 1,
            values: [6, 59, 0],
        });
        let frame = compose(&i);
        assert_eq!(&frame.digits[..4], &[Some(0), Some(6), Some(5), Some(9)]);
        assert_eq!(frame.blink_mask, 0b1100);
    }

    #[test]
    fn test_edit_year_uses_four_digits() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Date(DatePage::Date), t(2024, 1, 1, 0, 0, 0), &settings, &config);
        i.edit = Some(EditView {
            kind: EditKind::Date,
            index: 0,
            values: [2031, 1, 1],
        });
        let frame = compose(&i);
        assert_eq!(&frame.digits[..4], &[Some(2), Some(0), Some(3), Some(1)]);
        assert_eq!(frame.blink_mask, 0b1111);
    }

    #[test]
    fn test_ambient_brightness_applied() {
        let settings = UserSettings::default();
        let config = DisplayConfig::default();
        let mut i = inputs(Mode::Time, t(2024, 1, 1, 12, 0, 0), &settings, &config);
        i.lux = Some(10);
        assert_eq!(compose(&i).brightness, config.brightness_dim);

        i.dimming = false;
        assert_eq!(compose(&i).brightness, config.brightness_full);
    }

    #[test]
    fn test_four_digit_frame_blanks_tail() {
        let settings = UserSettings::default();
        let config = DisplayConfig {
            size: 4,
            ..Default::default()
        };
        let frame = compose(&inputs(Mode::TubeTest, t(2024, 1, 1, 0, 0, 3), &settings, &config));
        assert_eq!(frame.digit(3), Some(3));
        assert_eq!(frame.digit(4), None);
        assert_eq!(frame.digits[5], None);
    }
}
