//! GPIO alert output
//!
//! Drives a beeper, a switched appliance and a pulse solenoid from plain
//! GPIO pins (directly or via a transistor/relay). Pulses are timed here:
//! [`GpioAlert::service`] must be called every tick so that they end.

use embedded_hal::digital::OutputPin;
use nightstand_core::signal::OutputKind;
use nightstand_core::time::Instant;
use nightstand_core::traits::AlertOutput;

/// One output line with its polarity
struct Line<P> {
    pin: P,
    /// If true, output ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> Line<P> {
    fn new(pin: P, inverted: bool) -> Self {
        let mut line = Self {
            pin,
            inverted,
            on: true,
        };
        // Ensure output starts off
        line.set(false);
        line
    }

    fn set(&mut self, on: bool) {
        self.on = on;
        // Pin errors are not recoverable here; the next write retries
        let _ = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

/// Alert hardware on GPIO pins
///
/// Boards without one of the outputs pass [`NoPin`](crate::NoPin) for it.
pub struct GpioAlert<B, S, P> {
    beep: Line<B>,
    switch: Line<S>,
    pulse: Line<P>,
    now: Instant,
    beep_until: Option<Instant>,
    pulse_until: Option<Instant>,
}

impl<B: OutputPin, S: OutputPin, P: OutputPin> GpioAlert<B, S, P> {
    /// Create the alert output with all lines off
    ///
    /// # Arguments
    /// - `beep`, `switch`, `pulse`: the output pins
    /// - `active_low`: per-line polarity, in the same order
    pub fn new(beep: B, switch: S, pulse: P, active_low: [bool; 3]) -> Self {
        Self {
            beep: Line::new(beep, active_low[0]),
            switch: Line::new(switch, active_low[1]),
            pulse: Line::new(pulse, active_low[2]),
            now: Instant::from_millis(0),
            beep_until: None,
            pulse_until: None,
        }
    }

    /// Create the alert output with active-high lines
    pub fn new_active_high(beep: B, switch: S, pulse: P) -> Self {
        Self::new(beep, switch, pulse, [false; 3])
    }

    /// Advance the output clock and end finished pulses
    pub fn service(&mut self, now: Instant) {
        self.now = now;
        if Self::finished(self.beep_until, now) {
            self.beep.set(false);
            self.beep_until = None;
        }
        if Self::finished(self.pulse_until, now) {
            self.pulse.set(false);
            self.pulse_until = None;
        }
    }

    /// Whether any pulse line is currently driven
    pub fn is_pulsing(&self) -> bool {
        self.beep.on || self.pulse.on
    }

    pub fn is_switch_on(&self) -> bool {
        self.switch.on
    }

    fn finished(until: Option<Instant>, now: Instant) -> bool {
        // Compare via wrapping distance so the counter can roll over
        until.is_some_and(|end| now.since(end) < u32::MAX / 2)
    }
}

impl<B: OutputPin, S: OutputPin, P: OutputPin> AlertOutput for GpioAlert<B, S, P> {
    fn emit_pulse(&mut self, kind: OutputKind, duration_ms: u16) {
        let end = self.now + u32::from(duration_ms);
        match kind {
            OutputKind::Beep => {
                self.beep.set(true);
                self.beep_until = Some(end);
            }
            OutputKind::Pulse => {
                self.pulse.set(true);
                self.pulse_until = Some(end);
            }
            // The switch is level-driven through set_switch
            OutputKind::Switch => {}
        }
    }

    fn set_switch(&mut self, on: bool) {
        self.switch.set(on);
    }
}
