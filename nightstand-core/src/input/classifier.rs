//! Raw sample to control event classification
//!
//! Each button gets a [`ButtonClassifier`] that debounces the raw level and
//! tracks how long it has been held. [`InputClassifier`] bundles the four
//! controls and the rotary velocity tracker and is polled once per tick.

use heapless::Vec;

use super::events::{ControlEvent, ControlId, HoldLevel, Transition, Velocity};
use super::velocity::VelocityTracker;
use crate::config::{HoldThresholds, InputConfig};
use crate::time::Instant;

/// Raw control levels sampled this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlSamples {
    pub select: bool,
    pub alt: bool,
    pub up: bool,
    pub down: bool,
    /// Rotary detents since the last tick (positive = clockwise)
    pub rotary: i8,
}

impl ControlSamples {
    fn level(&self, control: ControlId) -> bool {
        match control {
            ControlId::Select => self.select,
            ControlId::Alt => self.alt,
            ControlId::Up => self.up,
            ControlId::Down => self.down,
        }
    }
}

/// Debounce and hold tracking for one button
#[derive(Debug, Clone)]
pub struct ButtonClassifier {
    pressed: bool,
    last_change: Instant,
    level: HoldLevel,
}

impl ButtonClassifier {
    pub fn new(now: Instant) -> Self {
        Self {
            pressed: false,
            last_change: now,
            level: HoldLevel::Tap,
        }
    }

    /// Debounced state
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample
    ///
    /// A change within `debounce_ms` of the last accepted change is
    /// ignored. While held, at most one hold level is promoted per call,
    /// so a late tick catches up over the following ticks.
    pub fn update(
        &mut self,
        raw: bool,
        now: Instant,
        debounce_ms: u32,
        thresholds: &HoldThresholds,
    ) -> Option<Transition> {
        if raw != self.pressed {
            if !now.has_elapsed(self.last_change, debounce_ms) {
                return None;
            }
            self.pressed = raw;
            self.last_change = now;
            return if raw {
                self.level = HoldLevel::Tap;
                Some(Transition::Press)
            } else {
                Some(Transition::Release(self.level))
            };
        }

        if self.pressed {
            let next = self.level.next()?;
            if now.has_elapsed(self.last_change, thresholds.threshold_ms(next)) {
                self.level = next;
                return Some(Transition::Hold(next));
            }
        }

        None
    }
}

/// All controls plus rotary velocity
#[derive(Debug, Clone)]
pub struct InputClassifier {
    buttons: [ButtonClassifier; 4],
    velocity: VelocityTracker,
    config: InputConfig,
    rotary: bool,
}

impl InputClassifier {
    /// Create a classifier
    ///
    /// With `rotary` set, Up/Down events come from the rotary detent count
    /// instead of the Up/Down button levels.
    pub fn new(config: InputConfig, rotary: bool, now: Instant) -> Self {
        Self {
            buttons: core::array::from_fn(|_| ButtonClassifier::new(now)),
            velocity: VelocityTracker::new(config.velocity_engage_ms, config.velocity_disengage_ms),
            config,
            rotary,
        }
    }

    /// Classify one tick of raw samples
    pub fn poll(&mut self, samples: &ControlSamples, now: Instant) -> Vec<ControlEvent, 4> {
        let mut events = Vec::new();

        for (control, button) in ControlId::ALL.into_iter().zip(self.buttons.iter_mut()) {
            if self.rotary && control.direction() != 0 {
                continue;
            }
            let Some(kind) = button.update(
                samples.level(control),
                now,
                self.config.debounce_ms,
                &self.config.hold,
            ) else {
                continue;
            };

            let velocity = match kind {
                Transition::Hold(level) | Transition::Release(level)
                    if control.direction() != 0 && level >= HoldLevel::Long =>
                {
                    Velocity::High
                }
                _ => Velocity::Low,
            };
            let _ = events.push(ControlEvent {
                control,
                kind,
                velocity,
            });
        }

        if self.rotary && samples.rotary != 0 {
            let mut velocity = Velocity::Low;
            for _ in 0..samples.rotary.unsigned_abs() {
                velocity = self.velocity.record(now);
            }
            let control = if samples.rotary > 0 {
                ControlId::Up
            } else {
                ControlId::Down
            };
            let _ = events.push(ControlEvent {
                control,
                kind: Transition::Release(HoldLevel::Tap),
                velocity,
            });
        }

        events
    }

    /// Whether a control is currently held down
    pub fn is_pressed(&self, control: ControlId) -> bool {
        let index = ControlId::ALL
            .iter()
            .position(|c| *c == control)
            .unwrap_or(0);
        self.buttons[index].is_pressed()
    }
}
