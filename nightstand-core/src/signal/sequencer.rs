//! Alert signal sequencer
//!
//! Turns alert requests from the alarm, the timer and the hourly chime into
//! pulses on an [`AlertOutput`]. One session runs at a time. Requests that
//! arrive while another source is sounding wait in a per-source slot
//! (repeat requests coalesce) and start, highest priority first, when the
//! active session ends.

use serde::{Deserialize, Serialize};

use super::pattern::{PulseSchedule, SignalPattern};
use crate::config::{Outputs, SignalConfig};
use crate::time::Instant;
use crate::traits::AlertOutput;

/// Who asked for the signal, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalSource {
    Alarm,
    Timer,
    Chime,
}

impl SignalSource {
    const ALL: [SignalSource; 3] = [SignalSource::Alarm, SignalSource::Timer, SignalSource::Chime];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Physical kind of alert output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum OutputKind {
    /// Piezo or speaker tone
    #[default]
    Beep,
    /// Switched appliance (radio, lamp) held on for the session
    Switch,
    /// Mechanical pulse (bell solenoid)
    Pulse,
}

impl OutputKind {
    pub const ALL: [OutputKind; 3] = [OutputKind::Beep, OutputKind::Switch, OutputKind::Pulse];
}

/// A request for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalRequest {
    pub source: SignalSource,
    pub pattern: SignalPattern,
    pub output: OutputKind,
}

/// The sounding session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalSession {
    pub source: SignalSource,
    pub output: OutputKind,
    pub started: Instant,
    pub pulses: u16,
    pub bound_ms: u32,
    schedule: PulseSchedule,
}

impl SignalSession {
    pub fn pattern(&self) -> SignalPattern {
        self.schedule.pattern()
    }

    /// Offset of the next pulse from the session start
    pub fn next_pulse_ms(&self) -> Option<u32> {
        self.schedule.next_offset_ms()
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalEnd {
    /// Pattern ran out
    Complete,
    /// Hard duration bound reached
    Bound,
    /// User stopped it
    Dismissed,
}

/// Session lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalEvent {
    Started(SignalSource),
    Ended(SignalSource, SignalEnd),
}

/// Single-session alert sequencer
#[derive(Debug, Clone)]
pub struct SignalSequencer {
    config: SignalConfig,
    active: Option<SignalSession>,
    queued: [Option<SignalRequest>; 3],
}

impl SignalSequencer {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            active: None,
            queued: [None; 3],
        }
    }

    /// Ask for a signal
    ///
    /// A request from the source already sounding is dropped; otherwise it
    /// replaces anything waiting in that source's slot.
    pub fn request(&mut self, request: SignalRequest) {
        if self.active.is_some_and(|s| s.source == request.source) {
            return;
        }
        self.queued[request.source.slot()] = Some(request);
    }

    pub fn active(&self) -> Option<&SignalSession> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_queued(&self, source: SignalSource) -> bool {
        self.queued[source.slot()].is_some()
    }

    /// Whether the switch output is currently held on by a session
    pub fn switch_on(&self) -> bool {
        self.active.is_some_and(|s| s.output == OutputKind::Switch)
    }

    /// Run one tick: end, start or pulse sessions as due
    pub fn tick<A: AlertOutput>(&mut self, now: Instant, alert: &mut A) -> Option<SignalEvent> {
        if let Some(session) = self.active.as_mut() {
            let elapsed = now.since(session.started);
            if elapsed >= session.bound_ms {
                return self.finish(SignalEnd::Bound, alert);
            }
            if session.output == OutputKind::Switch {
                return None;
            }

            let Some(due) = session.schedule.next_offset_ms() else {
                return self.finish(SignalEnd::Complete, alert);
            };
            if elapsed < due {
                return None;
            }

            let length = pulse_length(&self.config, session.output);
            alert.emit_pulse(session.output, length);
            session.pulses = session.pulses.saturating_add(1);
            // Skip pulses missed by a late tick instead of bursting them
            while session.schedule.next_offset_ms().is_some_and(|d| d <= elapsed) {
                session.schedule.advance();
            }
            return None;
        }

        let request = SignalSource::ALL
            .into_iter()
            .find_map(|source| self.queued[source.slot()].take())?;
        Some(self.start(request, now, alert))
    }

    fn start<A: AlertOutput>(
        &mut self,
        request: SignalRequest,
        now: Instant,
        alert: &mut A,
    ) -> SignalEvent {
        info!("Signal start: {} {}", request.source, request.output);
        let mut session = SignalSession {
            source: request.source,
            output: request.output,
            started: now,
            pulses: 0,
            bound_ms: bound_ms(&self.config, request.output),
            schedule: PulseSchedule::new(request.pattern, u32::from(self.config.fibonacci_unit_ms)),
        };

        match request.output {
            OutputKind::Switch => alert.set_switch(true),
            kind => {
                alert.emit_pulse(kind, pulse_length(&self.config, kind));
                session.pulses = 1;
                session.schedule.advance();
            }
        }

        self.active = Some(session);
        SignalEvent::Started(request.source)
    }

    fn finish<A: AlertOutput>(&mut self, reason: SignalEnd, alert: &mut A) -> Option<SignalEvent> {
        let session = self.active.take()?;
        if session.output == OutputKind::Switch {
            alert.set_switch(false);
        }
        info!("Signal end: {} {}", session.source, reason);
        Some(SignalEvent::Ended(session.source, reason))
    }

    /// Stop the active session
    ///
    /// Queued requests from other sources start on the next tick.
    pub fn dismiss<A: AlertOutput>(&mut self, alert: &mut A) -> Option<SignalEvent> {
        self.finish(SignalEnd::Dismissed, alert)
    }

    /// Drop a waiting request
    pub fn cancel_queued(&mut self, source: SignalSource) {
        self.queued[source.slot()] = None;
    }

    /// Switch the active session to the next wired output
    ///
    /// Timing continues from the original start. Returns the new output.
    pub fn cycle_signal<A: AlertOutput>(
        &mut self,
        outputs: &Outputs,
        alert: &mut A,
    ) -> Option<OutputKind> {
        let session = self.active.as_mut()?;
        let next = outputs.next_after(session.output)?;
        if next == session.output {
            return Some(next);
        }

        if session.output == OutputKind::Switch {
            alert.set_switch(false);
        }
        if next == OutputKind::Switch {
            alert.set_switch(true);
        }
        debug!("Signal output {} -> {}", session.output, next);
        session.output = next;
        session.bound_ms = bound_ms(&self.config, next);
        Some(next)
    }
}

fn bound_ms(config: &SignalConfig, output: OutputKind) -> u32 {
    let seconds = match output {
        OutputKind::Switch => config.switch_duration_s,
        _ => config.signal_duration_s,
    };
    u32::from(seconds) * 1000
}

fn pulse_length(config: &SignalConfig, output: OutputKind) -> u16 {
    match output {
        OutputKind::Pulse => config.pulse_length_ms,
        _ => config.beep_length_ms,
    }
}
