//! Persisted user settings
//!
//! Everything the user can change at runtime lives in [`UserSettings`].
//! It is stored as a [`SettingsBlock`]: a postcard-encoded payload framed by
//! a magic number, a format version and a CRC32 so that erased or torn
//! writes are detected on load.

use serde::{Deserialize, Serialize};

use super::types::ClockConfig;
use crate::alarm::AlarmConfig;
use crate::display::{DateFormat, DimmingMode, NightDim, TimeFormat};
use crate::signal::{OutputKind, SignalPattern};
use crate::time::calendar::days_in_month;
use crate::time::{DstRule, Location};
use crate::timer::{TimerBehavior, TIMER_CAP_MS};
use crate::traits::StorageError;

/// Magic number marking a settings block ("NSTD")
pub const SETTINGS_MAGIC: u32 = 0x4E53_5444;

/// Current settings format version
pub const SETTINGS_VERSION: u8 = 1;

/// Scratch buffer large enough for an encoded [`SettingsBlock`]
pub const SETTINGS_BUFFER_SIZE: usize = 128;

/// Anniversary shown by the day counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct CounterDate {
    pub month: u8,
    pub day: u8,
    /// Count days since instead of days until
    pub count_up: bool,
}

impl Default for CounterDate {
    fn default() -> Self {
        Self {
            month: 12,
            day: 25,
            count_up: false,
        }
    }
}

/// User-adjustable settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct UserSettings {
    pub alarm: AlarmConfig,
    pub timer_preset_s: u32,
    pub timer_behavior: TimerBehavior,
    pub timer_pattern: SignalPattern,
    pub alarm_output: OutputKind,
    pub timer_output: OutputKind,
    /// Hourly chime
    pub chime: bool,
    pub chime_output: OutputKind,
    pub time_format: TimeFormat,
    pub date_format: DateFormat,
    /// Show a leading zero on single-digit hours
    pub leading_zero: bool,
    pub dst_rule: DstRule,
    /// Whether the stored time already includes the DST hour
    pub dst_active: bool,
    pub location: Location,
    pub counter: CounterDate,
    pub night_dim: NightDim,
    pub dimming: DimmingMode,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::defaults_for(&ClockConfig::default())
    }
}

impl UserSettings {
    /// Factory defaults for a given appliance build
    ///
    /// Signal outputs default to the first output that is actually wired.
    pub fn defaults_for(config: &ClockConfig) -> Self {
        let first = config.outputs.first().unwrap_or_default();
        Self {
            alarm: AlarmConfig::default(),
            timer_preset_s: 0,
            timer_behavior: TimerBehavior::Countdown,
            timer_pattern: SignalPattern::Fibonacci,
            alarm_output: first,
            timer_output: first,
            chime: false,
            chime_output: config.outputs.first_audible().unwrap_or_default(),
            time_format: TimeFormat::H24,
            date_format: DateFormat::MonthDayYear,
            leading_zero: true,
            dst_rule: DstRule::Off,
            dst_active: false,
            location: Location::default(),
            counter: CounterDate::default(),
            night_dim: NightDim::default(),
            dimming: if config.features.dimming {
                DimmingMode::Ambient
            } else {
                DimmingMode::Fixed
            },
        }
    }
}

const MINUTES_PER_DAY: u16 = 24 * 60;
const MAX_UTC_OFFSET_MIN: i16 = 14 * 60;

/// Clamp a day of the anniversary calendar (leap year, so Feb 29 stays)
fn clamp_month_day(month: u8, day: u8) -> (u8, u8) {
    let month = month.clamp(1, 12);
    (month, day.clamp(1, days_in_month(2000, month)))
}

impl UserSettings {
    /// Bring loaded values back into range
    ///
    /// A block can verify and still carry values this build cannot use
    /// (written by other firmware, or naming outputs that are not fitted).
    /// Returns the number of adjustments made; each one is logged.
    pub fn validate(&mut self, config: &ClockConfig) -> u8 {
        let mut adjusted = 0;

        if self.alarm.hour > 23 || self.alarm.minute > 59 {
            warn!("Alarm time {}:{} out of range, clamping", self.alarm.hour, self.alarm.minute);
            self.alarm.hour = self.alarm.hour.min(23);
            self.alarm.minute = self.alarm.minute.min(59);
            adjusted += 1;
        }
        if let Some(away) = self.alarm.auto_skip.away.as_mut() {
            let start = clamp_month_day(away.start.0, away.start.1);
            let end = clamp_month_day(away.end.0, away.end.1);
            if start != away.start || end != away.end {
                warn!("Away range out of range, clamping");
                away.start = start;
                away.end = end;
                adjusted += 1;
            }
        }
        if self.timer_preset_s > TIMER_CAP_MS / 1000 {
            warn!("Timer preset {} s too long, clamping", self.timer_preset_s);
            self.timer_preset_s = TIMER_CAP_MS / 1000;
            adjusted += 1;
        }

        let (month, day) = clamp_month_day(self.counter.month, self.counter.day);
        if (month, day) != (self.counter.month, self.counter.day) {
            warn!("Counter date {}/{} invalid, clamping", self.counter.month, self.counter.day);
            self.counter.month = month;
            self.counter.day = day;
            adjusted += 1;
        }

        let night = &mut self.night_dim;
        if night.start_min >= MINUTES_PER_DAY || night.end_min >= MINUTES_PER_DAY {
            warn!("Night dim range out of range, clamping");
            night.start_min = night.start_min.min(MINUTES_PER_DAY - 1);
            night.end_min = night.end_min.min(MINUTES_PER_DAY - 1);
            adjusted += 1;
        }

        let loc = &mut self.location;
        let clamped = Location {
            lat_x100: loc.lat_x100.clamp(-9000, 9000),
            lon_x100: loc.lon_x100.clamp(-18000, 18000),
            utc_offset_min: loc.utc_offset_min.clamp(-MAX_UTC_OFFSET_MIN, MAX_UTC_OFFSET_MIN),
        };
        if clamped != *loc {
            warn!("Location out of range, clamping");
            *loc = clamped;
            adjusted += 1;
        }

        let outputs = &config.outputs;
        if let Some(first) = outputs.first() {
            if !outputs.has(self.alarm_output) || !outputs.has(self.timer_output) {
                warn!("Signal output not fitted, using {}", first);
                if !outputs.has(self.alarm_output) {
                    self.alarm_output = first;
                }
                if !outputs.has(self.timer_output) {
                    self.timer_output = first;
                }
                adjusted += 1;
            }
        }
        if let Some(audible) = outputs.first_audible() {
            if self.chime_output == OutputKind::Switch || !outputs.has(self.chime_output) {
                self.chime_output = audible;
                adjusted += 1;
            }
        }

        adjusted
    }
}

/// Settings framed for non-volatile storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct SettingsBlock {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    pub settings: UserSettings,
    /// CRC32 over magic, version and the encoded settings
    pub crc: u32,
}

impl SettingsBlock {
    /// Wrap settings in a sealed block
    pub fn new(settings: UserSettings) -> Self {
        let mut block = Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            settings,
            crc: 0,
        };
        block.update_crc();
        block
    }

    /// Check the header (magic and version)
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Calculate CRC32 for the block (excluding the crc field itself)
    ///
    /// Returns `None` if the settings do not fit the scratch buffer.
    pub fn calculate_crc(&self) -> Option<u32> {
        let mut buf = [0u8; SETTINGS_BUFFER_SIZE];
        let payload = postcard::to_slice(&self.settings, &mut buf).ok()?;

        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, payload);
        Some(!crc)
    }

    /// Update the stored CRC
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc().unwrap_or(0);
    }

    /// Verify the stored CRC
    pub fn verify_crc(&self) -> bool {
        self.calculate_crc() == Some(self.crc)
    }

    /// Serialize into `buf`, returning the used part
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], StorageError> {
        postcard::to_slice(self, buf).map_err(|_| StorageError::Io)
    }

    /// Parse and validate a stored block
    ///
    /// Erased memory (empty or all `0xFF`) reads as [`StorageError::Absent`];
    /// anything else that fails to parse or verify is
    /// [`StorageError::Corrupt`]. Trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.iter().all(|b| *b == 0xFF) {
            return Err(StorageError::Absent);
        }

        let block: Self = postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupt)?;
        if !block.is_valid() || !block.verify_crc() {
            return Err(StorageError::Corrupt);
        }
        Ok(block)
    }
}

/// CRC32 update function (IEEE polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
