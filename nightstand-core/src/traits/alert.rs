//! Alert output trait

use crate::signal::OutputKind;

/// Trait for the alert hardware (piezo, switched appliance, solenoid)
///
/// The signal sequencer only decides *when* something happens; the
/// implementation decides what a pulse of a given kind looks like.
pub trait AlertOutput {
    /// Emit one discrete pulse of `duration_ms`
    ///
    /// Called for [`OutputKind::Beep`] and [`OutputKind::Pulse`]. The
    /// implementation ends the pulse on its own.
    fn emit_pulse(&mut self, kind: OutputKind, duration_ms: u16);

    /// Turn the switched output on or off
    fn set_switch(&mut self, on: bool);
}
