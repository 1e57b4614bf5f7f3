//! Configuration type definitions
//!
//! These types describe the appliance build: which controls and functions
//! exist, timing constants and display limits. The configuration is built
//! once at startup and never changes while the clock runs; user choices
//! that do change live in [`super::UserSettings`].

use serde::{Deserialize, Serialize};

use crate::input::HoldLevel;
use crate::settings::TimeoutPolicy;
use crate::signal::OutputKind;
use crate::time::TimeSourceKind;

/// Largest supported display (digit positions)
pub const MAX_DISPLAY_SIZE: u8 = 6;

/// Hold duration thresholds (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct HoldThresholds {
    pub short_ms: u32,
    pub long_ms: u32,
    pub very_long_ms: u32,
    pub super_long_ms: u32,
}

impl Default for HoldThresholds {
    fn default() -> Self {
        Self {
            short_ms: 1000,
            long_ms: 3000,
            very_long_ms: 5000,
            super_long_ms: 10000,
        }
    }
}

impl HoldThresholds {
    /// Time a control must be held to reach `level`
    pub fn threshold_ms(&self, level: HoldLevel) -> u32 {
        match level {
            HoldLevel::Tap => 0,
            HoldLevel::Short => self.short_ms,
            HoldLevel::Long => self.long_ms,
            HoldLevel::VeryLong => self.very_long_ms,
            HoldLevel::SuperLong => self.super_long_ms,
        }
    }

    /// Whether thresholds are strictly increasing
    pub fn is_ordered(&self) -> bool {
        0 < self.short_ms
            && self.short_ms < self.long_ms
            && self.long_ms < self.very_long_ms
            && self.very_long_ms < self.super_long_ms
    }
}

/// Input timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct InputConfig {
    /// Changes closer together than this are treated as bounce
    pub debounce_ms: u32,
    pub hold: HoldThresholds,
    /// Mean rotary step interval below which velocity is high
    pub velocity_engage_ms: u32,
    /// A pause longer than this forgets earlier rotary steps
    pub velocity_disengage_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 20,
            hold: HoldThresholds::default(),
            velocity_engage_ms: 80,
            velocity_disengage_ms: 500,
        }
    }
}

/// Navigation and timer timeouts (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Edit session inactivity timeout
    pub setting_timeout_s: u16,
    /// Date page returns to the time page after this long
    pub fn_temp_timeout_s: u16,
    /// Date sub-pages and the function menu time out after this long
    pub fn_page_timeout_s: u16,
    /// A paused timer returns to idle after this long
    pub stopwatch_timeout_s: u16,
    /// An expired countdown stops alerting after this long
    pub expiry_timeout_s: u16,
    /// What an edit session does when it times out
    pub edit_policy: TimeoutPolicy,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            setting_timeout_s: 300,
            fn_temp_timeout_s: 5,
            fn_page_timeout_s: 3,
            stopwatch_timeout_s: 3600,
            expiry_timeout_s: 180,
            edit_policy: TimeoutPolicy::Commit,
        }
    }
}

/// Alert signal timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct SignalConfig {
    /// Hard bound on a beep or pulse session
    pub signal_duration_s: u16,
    /// Hard bound on a switch session
    pub switch_duration_s: u16,
    /// Length of one mechanical pulse
    pub pulse_length_ms: u16,
    /// Length of one beep
    pub beep_length_ms: u16,
    /// Time unit of the Fibonacci wake pattern
    pub fibonacci_unit_ms: u16,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            signal_duration_s: 180,
            switch_duration_s: 7200,
            pulse_length_ms: 200,
            beep_length_ms: 500,
            fibonacci_unit_ms: 1000,
        }
    }
}

/// Display limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of digit positions (4 or 6)
    pub size: u8,
    /// Brightness in full light (0-15)
    pub brightness_full: u8,
    /// Brightness in the dark or during night dimming (0-15)
    pub brightness_dim: u8,
    /// Ambient level at and above which brightness is full
    pub lux_full: u16,
    /// Ambient level at and below which brightness is dim
    pub lux_dim: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            size: 6,
            brightness_full: 15,
            brightness_dim: 0,
            lux_full: 400,
            lux_dim: 30,
        }
    }
}

/// Which controls and functions the appliance has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct Features {
    /// An Alt button is fitted
    pub has_alt: bool,
    /// Up/Down come from a rotary control
    pub rotary: bool,
    pub time_source: TimeSourceKind,
    pub date_fn: bool,
    /// Day counter page (requires `date_fn`)
    pub counter: bool,
    /// Sunrise/sunset pages (requires `date_fn`)
    pub sun: bool,
    pub alarm: bool,
    pub auto_skip: bool,
    pub timer: bool,
    pub temperature: bool,
    pub tube_test: bool,
    /// Hourly chime
    pub chime: bool,
    /// Ambient light dimming
    pub dimming: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            has_alt: false,
            rotary: false,
            time_source: TimeSourceKind::Millis,
            date_fn: true,
            counter: true,
            sun: true,
            alarm: true,
            auto_skip: true,
            timer: true,
            temperature: false,
            tube_test: false,
            chime: true,
            dimming: true,
        }
    }
}

/// Which alert outputs are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct Outputs {
    pub beep: bool,
    pub switch: bool,
    pub pulse: bool,
}

impl Default for Outputs {
    fn default() -> Self {
        Self {
            beep: true,
            switch: false,
            pulse: false,
        }
    }
}

impl Outputs {
    pub fn has(&self, kind: OutputKind) -> bool {
        match kind {
            OutputKind::Beep => self.beep,
            OutputKind::Switch => self.switch,
            OutputKind::Pulse => self.pulse,
        }
    }

    /// First wired output, preferring beep
    pub fn first(&self) -> Option<OutputKind> {
        OutputKind::ALL.into_iter().find(|k| self.has(*k))
    }

    /// Next wired output after `kind`, wrapping
    pub fn next_after(&self, kind: OutputKind) -> Option<OutputKind> {
        let start = OutputKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        (1..=OutputKind::ALL.len())
            .map(|i| OutputKind::ALL[(start + i) % OutputKind::ALL.len()])
            .find(|k| self.has(*k))
    }

    /// First wired output that can chime (switch cannot)
    pub fn first_audible(&self) -> Option<OutputKind> {
        OutputKind::ALL
            .into_iter()
            .find(|k| *k != OutputKind::Switch && self.has(*k))
    }
}

/// Complete appliance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub struct ClockConfig {
    pub input: InputConfig,
    pub timeouts: TimeoutConfig,
    /// Software clock correction (ms per second, positive = run faster)
    pub drift_ms_per_s: i16,
    /// Seconds between drift corrections
    pub drift_interval_s: u16,
    pub signal: SignalConfig,
    pub display: DisplayConfig,
    pub features: Features,
    pub outputs: Outputs,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            timeouts: TimeoutConfig::default(),
            drift_ms_per_s: 0,
            drift_interval_s: 1,
            signal: SignalConfig::default(),
            display: DisplayConfig::default(),
            features: Features::default(),
            outputs: Outputs::default(),
        }
    }
}

impl ClockConfig {
    /// Clamp out-of-range values to something usable
    ///
    /// Returns the number of adjustments made; each one is logged.
    pub fn validate(&mut self) -> u8 {
        let mut adjusted = 0;

        if !self.input.hold.is_ordered() {
            warn!("Hold thresholds not increasing, using defaults");
            self.input.hold = HoldThresholds::default();
            adjusted += 1;
        }
        if self.input.velocity_engage_ms >= self.input.velocity_disengage_ms {
            warn!("Velocity engage >= disengage, using defaults");
            let defaults = InputConfig::default();
            self.input.velocity_engage_ms = defaults.velocity_engage_ms;
            self.input.velocity_disengage_ms = defaults.velocity_disengage_ms;
            adjusted += 1;
        }
        if self.drift_interval_s == 0 {
            warn!("Drift interval 0, using 1 s");
            self.drift_interval_s = 1;
            adjusted += 1;
        }
        if self.display.size != 4 && self.display.size != MAX_DISPLAY_SIZE {
            warn!("Display size {} unsupported, using 6", self.display.size);
            self.display.size = MAX_DISPLAY_SIZE;
            adjusted += 1;
        }
        if self.display.brightness_full > 15 {
            self.display.brightness_full = 15;
            adjusted += 1;
        }
        if self.display.brightness_dim > self.display.brightness_full {
            warn!("Dim brightness above full, clamping");
            self.display.brightness_dim = self.display.brightness_full;
            adjusted += 1;
        }
        if self.display.lux_dim >= self.display.lux_full {
            warn!("Lux dim >= lux full, using defaults");
            let defaults = DisplayConfig::default();
            self.display.lux_dim = defaults.lux_dim;
            self.display.lux_full = defaults.lux_full;
            adjusted += 1;
        }
        if self.signal.fibonacci_unit_ms == 0 {
            self.signal.fibonacci_unit_ms = SignalConfig::default().fibonacci_unit_ms;
            adjusted += 1;
        }
        if self.timeouts.setting_timeout_s == 0 {
            self.timeouts.setting_timeout_s = TimeoutConfig::default().setting_timeout_s;
            adjusted += 1;
        }
        if !self.features.date_fn && (self.features.counter || self.features.sun) {
            warn!("Counter/sun pages need the date function, disabling");
            self.features.counter = false;
            self.features.sun = false;
            adjusted += 1;
        }

        adjusted
    }
}
