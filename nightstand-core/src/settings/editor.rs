//! Edit session over one numeric field
//!
//! At most one [`SettingsSession`] exists at a time; it lives in an
//! `Option` inside [`SettingsEditor`]. Every way out of a session goes
//! through [`SettingsEditor::clear_set`], which takes the session out of
//! the slot, so the end of a session is reported exactly once.

use serde::{Deserialize, Serialize};

use crate::input::Velocity;
use crate::time::Instant;

/// Editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingField {
    TimeHour,
    TimeMinute,
    DateYear,
    DateMonth,
    DateDay,
    CounterMonth,
    CounterDay,
    AlarmHour,
    AlarmMinute,
    TimerHours,
    TimerMinutes,
    TimerSeconds,
}

/// What an idle session does when it times out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Keep the edited value
    #[default]
    Commit,
    /// Discard the edited value
    Cancel,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndReason {
    Commit,
    Cancel,
    Timeout,
}

/// Result of ending a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionEnd {
    pub field: SettingField,
    /// Value to apply: the edited value if committed, the original otherwise
    pub value: i32,
    pub committed: bool,
    pub reason: EndReason,
}

/// Open edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingsSession {
    pub field: SettingField,
    pub value: i32,
    pub initial: i32,
    pub min: i32,
    pub max: i32,
    pub last_activity: Instant,
}

/// Single-slot edit session manager
#[derive(Debug, Clone)]
pub struct SettingsEditor {
    session: Option<SettingsSession>,
    timeout_ms: u32,
    policy: TimeoutPolicy,
}

impl SettingsEditor {
    pub fn new(timeout_s: u16, policy: TimeoutPolicy) -> Self {
        Self {
            session: None,
            timeout_ms: u32::from(timeout_s) * 1000,
            policy,
        }
    }

    /// Open a session on `field`
    ///
    /// An already open session is cancelled first and its end returned.
    /// The starting value is clamped into `[min, max]`.
    pub fn start_set(
        &mut self,
        field: SettingField,
        current: i32,
        min: i32,
        max: i32,
        now: Instant,
    ) -> Option<SessionEnd> {
        let replaced = self.clear_set(EndReason::Cancel);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let value = current.clamp(min, max);
        debug!("Edit {} = {} [{}..{}]", field, value, min, max);
        self.session = Some(SettingsSession {
            field,
            value,
            initial: value,
            min,
            max,
            last_activity: now,
        });
        replaced
    }

    /// Apply `delta` steps to the open session
    ///
    /// The step is 1 or 10 depending on `velocity`; the result is clamped
    /// to the session bounds without wrapping. Returns the new value, or
    /// `None` with no session open.
    pub fn do_set(&mut self, delta: i32, velocity: Velocity, now: Instant) -> Option<i32> {
        let session = self.session.as_mut()?;
        let step = delta.saturating_mul(velocity.multiplier());
        session.value = session.value.saturating_add(step).clamp(session.min, session.max);
        session.last_activity = now;
        Some(session.value)
    }

    /// Refresh the inactivity timer without changing the value
    pub fn touch(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.last_activity = now;
        }
    }

    /// End the open session, if any
    pub fn clear_set(&mut self, reason: EndReason) -> Option<SessionEnd> {
        let session = self.session.take()?;
        let committed = match reason {
            EndReason::Commit => true,
            EndReason::Cancel => false,
            EndReason::Timeout => self.policy == TimeoutPolicy::Commit,
        };
        Some(SessionEnd {
            field: session.field,
            value: if committed {
                session.value
            } else {
                session.initial
            },
            committed,
            reason,
        })
    }

    /// End the session if it has been idle past the timeout
    pub fn poll_timeout(&mut self, now: Instant) -> Option<SessionEnd> {
        let idle = now.since(self.session.as_ref()?.last_activity);
        if idle >= self.timeout_ms {
            self.clear_set(EndReason::Timeout)
        } else {
            None
        }
    }

    pub fn session(&self) -> Option<&SettingsSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }
}
