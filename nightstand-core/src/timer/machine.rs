//! Timer state machine
//!
//! ```text
//! Idle ──start──> Running ──pause──> Paused ──start──> Running
//!                    │                  │
//!                 reaches 0        idle too long
//!                    v                  v
//!                 Expired ──clear/timeout──> Idle
//! ```
//!
//! All elapsed times are computed from the `started` timestamp, so a late
//! tick never loses or gains time.

use serde::{Deserialize, Serialize};

use crate::time::Instant;

/// Largest displayable value, 99:59:59
pub const TIMER_CAP_MS: u32 = (99 * 3600 + 59 * 60 + 59) * 1000;

/// What the timer does when started from idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum TimerBehavior {
    /// Count down, then alert until cleared
    #[default]
    Countdown,
    /// Count down, alert and start over
    CountdownRepeat,
    /// Count down, alert and keep counting up from zero
    CountdownThenChrono,
    /// Count up from zero
    Stopwatch,
}

impl TimerBehavior {
    pub fn next(self) -> Self {
        match self {
            TimerBehavior::Countdown => TimerBehavior::CountdownRepeat,
            TimerBehavior::CountdownRepeat => TimerBehavior::CountdownThenChrono,
            TimerBehavior::CountdownThenChrono => TimerBehavior::Stopwatch,
            TimerBehavior::Stopwatch => TimerBehavior::Countdown,
        }
    }
}

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    #[default]
    Idle,
    /// Counting from `base_ms` since `started`
    Running { started: Instant, base_ms: u32 },
    /// Stopped at `value_ms`
    Paused { value_ms: u32, since: Instant },
    /// Countdown finished and not yet cleared
    Expired { since: Instant },
}

/// Notable timer transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// Countdown reached zero and the timer now waits to be cleared
    Expired,
    /// An alert is due (repeat, chrono handover, or still expired)
    Alert,
    /// Returned to idle on its own
    TimedOut,
}

/// Countdown timer / stopwatch
#[derive(Debug, Clone)]
pub struct Timer {
    behavior: TimerBehavior,
    preset_ms: u32,
    state: TimerState,
    counting_up: bool,
}

impl Timer {
    pub fn new(behavior: TimerBehavior, preset_s: u32) -> Self {
        Self {
            behavior,
            preset_ms: preset_s.saturating_mul(1000).min(TIMER_CAP_MS),
            state: TimerState::Idle,
            counting_up: false,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn behavior(&self) -> TimerBehavior {
        self.behavior
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.state, TimerState::Expired { .. })
    }

    /// Counting up (stopwatch, or chrono after a countdown)
    pub fn counting_up(&self) -> bool {
        self.counting_up
    }

    pub fn preset_s(&self) -> u32 {
        self.preset_ms / 1000
    }

    /// Change the countdown preset (idle only)
    pub fn set_preset(&mut self, seconds: u32) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.preset_ms = seconds.saturating_mul(1000).min(TIMER_CAP_MS);
        true
    }

    /// Remaining (countdown) or elapsed (count-up) time
    ///
    /// Idle and expired timers read zero.
    pub fn value_ms(&self, now: Instant) -> u32 {
        match self.state {
            TimerState::Idle | TimerState::Expired { .. } => 0,
            TimerState::Paused { value_ms, .. } => value_ms,
            TimerState::Running { started, base_ms } => {
                let elapsed = now.since(started);
                if self.counting_up {
                    base_ms.saturating_add(elapsed).min(TIMER_CAP_MS)
                } else {
                    base_ms.saturating_sub(elapsed)
                }
            }
        }
    }

    /// Start from idle or resume from pause
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Idle => {
                self.counting_up = self.behavior == TimerBehavior::Stopwatch;
                if !self.counting_up && self.preset_ms == 0 {
                    return false;
                }
                let base_ms = if self.counting_up { 0 } else { self.preset_ms };
                debug!("Timer start {} ms", base_ms);
                self.state = TimerState::Running {
                    started: now,
                    base_ms,
                };
                true
            }
            TimerState::Paused { value_ms, .. } => {
                self.state = TimerState::Running {
                    started: now,
                    base_ms: value_ms,
                };
                true
            }
            _ => false,
        }
    }

    /// Pause a running timer, keeping its value
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = TimerState::Paused {
            value_ms: self.value_ms(now),
            since: now,
        };
        true
    }

    /// Start if stopped, pause if running
    pub fn start_pause(&mut self, now: Instant) -> bool {
        if self.is_running() {
            self.pause(now)
        } else {
            self.start(now)
        }
    }

    /// Return to idle from any state
    pub fn clear(&mut self) {
        self.state = TimerState::Idle;
        self.counting_up = false;
    }

    /// Advance to the next behavior (idle only)
    pub fn cycle_timer(&mut self) -> Option<TimerBehavior> {
        if !self.is_idle() {
            return None;
        }
        self.behavior = self.behavior.next();
        Some(self.behavior)
    }

    /// Run one tick
    ///
    /// While expired this returns [`TimerEvent::Alert`] every tick until
    /// the timer is cleared or `expiry_timeout_ms` passes.
    pub fn tick(
        &mut self,
        now: Instant,
        expiry_timeout_ms: u32,
        paused_timeout_ms: u32,
    ) -> Option<TimerEvent> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Running { started, base_ms } => {
                let elapsed = now.since(started);
                if self.counting_up {
                    if base_ms.saturating_add(elapsed) >= TIMER_CAP_MS {
                        self.state = TimerState::Paused {
                            value_ms: TIMER_CAP_MS,
                            since: now,
                        };
                    }
                    return None;
                }
                if elapsed < base_ms {
                    return None;
                }
                // Carry the overshoot into the next period
                let end = started + base_ms;
                self.on_zero(end, now)
            }
            TimerState::Paused { since, .. } => {
                if now.has_elapsed(since, paused_timeout_ms) {
                    debug!("Paused timer timed out");
                    self.clear();
                    Some(TimerEvent::TimedOut)
                } else {
                    None
                }
            }
            TimerState::Expired { since } => {
                if now.has_elapsed(since, expiry_timeout_ms) {
                    info!("Expired timer timed out");
                    self.clear();
                    Some(TimerEvent::TimedOut)
                } else {
                    Some(TimerEvent::Alert)
                }
            }
        }
    }

    fn on_zero(&mut self, end: Instant, now: Instant) -> Option<TimerEvent> {
        match self.behavior {
            TimerBehavior::CountdownRepeat if self.preset_ms > 0 => {
                info!("Timer repeat");
                self.state = TimerState::Running {
                    started: end,
                    base_ms: self.preset_ms,
                };
                Some(TimerEvent::Alert)
            }
            TimerBehavior::CountdownThenChrono => {
                info!("Timer zero, counting up");
                self.counting_up = true;
                self.state = TimerState::Running {
                    started: end,
                    base_ms: 0,
                };
                Some(TimerEvent::Alert)
            }
            _ => {
                info!("Timer expired");
                self.state = TimerState::Expired { since: now };
                Some(TimerEvent::Expired)
            }
        }
    }
}
