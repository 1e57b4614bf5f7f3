//! Commands emitted by the navigator
//!
//! The navigator never mutates clock, alarm or timer state itself; it
//! returns a [`Command`] for the controller to apply.

/// State change requested by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the time of day (seconds reset to zero)
    SetTime { hour: u8, minute: u8 },
    SetDate { year: u16, month: u8, day: u8 },
    /// Set the day counter's anniversary
    SetCounter { month: u8, day: u8 },
    SetAlarmTime { hour: u8, minute: u8 },
    SetTimerPreset { seconds: u32 },
    /// Cycle the alarm state in a direction
    SwitchAlarmState(i8),
    TimerStartPause,
    TimerClear,
    CycleTimer,
    /// Toggle the switched output by hand
    ToggleSwitch,
    /// Move the sounding signal to the next output
    CycleSignal,
    DismissSignal,
    /// Erase persisted settings
    FactoryReset,
}
