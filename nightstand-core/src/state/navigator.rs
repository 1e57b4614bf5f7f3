//! Page navigation and the edit sub-protocol
//!
//! The navigator owns which page is shown and which overlay is active.
//! Exactly one of navigation, editing or the function menu is in control
//! at a time; switching overlays always closes any open edit session.

use super::commands::Command;
use super::mode::{DatePage, Function, Mode, PageTimeout};
use crate::config::{Features, TimeoutConfig};
use crate::input::{ControlEvent, ControlId, HoldLevel, Transition, Velocity};
use crate::settings::{EndReason, SettingField, SettingsEditor};
use crate::time::calendar::days_in_month;
use crate::time::{ClockTime, Instant, MAX_YEAR, MIN_YEAR};

/// Leap year used to bound anniversary days (allows Feb 29)
const COUNTER_REFERENCE_YEAR: u16 = 2000;

/// Group of fields edited in sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditKind {
    Time,
    Date,
    Counter,
    Alarm,
    Timer,
}

impl EditKind {
    pub fn fields(self) -> &'static [SettingField] {
        match self {
            EditKind::Time => &[SettingField::TimeHour, SettingField::TimeMinute],
            EditKind::Date => &[
                SettingField::DateYear,
                SettingField::DateMonth,
                SettingField::DateDay,
            ],
            EditKind::Counter => &[SettingField::CounterMonth, SettingField::CounterDay],
            EditKind::Alarm => &[SettingField::AlarmHour, SettingField::AlarmMinute],
            EditKind::Timer => &[
                SettingField::TimerHours,
                SettingField::TimerMinutes,
                SettingField::TimerSeconds,
            ],
        }
    }

    fn for_mode(mode: Mode, ctx: &NavContext) -> Option<EditKind> {
        match mode {
            Mode::Time => Some(EditKind::Time),
            Mode::Date(DatePage::Date) => Some(EditKind::Date),
            Mode::Date(DatePage::Counter) => Some(EditKind::Counter),
            Mode::Alarm => Some(EditKind::Alarm),
            Mode::Timer if ctx.timer_idle => Some(EditKind::Timer),
            _ => None,
        }
    }

    fn initial_values(self, ctx: &NavContext) -> [i32; 3] {
        let t = &ctx.time;
        match self {
            EditKind::Time => [i32::from(t.hour()), i32::from(t.minute()), 0],
            EditKind::Date => [
                i32::from(t.year()),
                i32::from(t.month()),
                i32::from(t.day()),
            ],
            EditKind::Counter => [i32::from(ctx.counter.0), i32::from(ctx.counter.1), 0],
            EditKind::Alarm => [i32::from(ctx.alarm.0), i32::from(ctx.alarm.1), 0],
            EditKind::Timer => {
                let s = ctx.timer_preset_s as i32;
                [s / 3600, s / 60 % 60, s % 60]
            }
        }
    }
}

/// An edit in progress over a group of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditPlan {
    pub kind: EditKind,
    /// Field being edited
    pub index: usize,
    /// Committed (or initial) value of every field
    pub values: [i32; 3],
}

impl EditPlan {
    fn field(&self) -> SettingField {
        self.kind.fields()[self.index]
    }

    /// Bounds for the current field given the values committed so far
    fn bounds(&self) -> (i32, i32) {
        let v = &self.values;
        match self.field() {
            SettingField::TimeHour | SettingField::AlarmHour => (0, 23),
            SettingField::TimeMinute
            | SettingField::AlarmMinute
            | SettingField::TimerMinutes
            | SettingField::TimerSeconds => (0, 59),
            SettingField::TimerHours => (0, 99),
            SettingField::DateYear => (i32::from(MIN_YEAR), i32::from(MAX_YEAR)),
            SettingField::DateMonth | SettingField::CounterMonth => (1, 12),
            SettingField::DateDay => (1, i32::from(days_in_month(v[0] as u16, v[1] as u8))),
            SettingField::CounterDay => (
                1,
                i32::from(days_in_month(COUNTER_REFERENCE_YEAR, v[0] as u8)),
            ),
        }
    }

    /// The command that applies this plan
    fn command(&self) -> Command {
        let v = &self.values;
        match self.kind {
            EditKind::Time => Command::SetTime {
                hour: v[0] as u8,
                minute: v[1] as u8,
            },
            EditKind::Date => Command::SetDate {
                year: v[0] as u16,
                month: v[1] as u8,
                day: v[2] as u8,
            },
            EditKind::Counter => Command::SetCounter {
                month: v[0] as u8,
                day: v[1] as u8,
            },
            EditKind::Alarm => Command::SetAlarmTime {
                hour: v[0] as u8,
                minute: v[1] as u8,
            },
            EditKind::Timer => Command::SetTimerPreset {
                seconds: (v[0] * 3600 + v[1] * 60 + v[2]) as u32,
            },
        }
    }
}

/// What is layered over the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overlay {
    /// Plain navigation
    #[default]
    None,
    Editing(EditPlan),
    /// Function menu with the highlighted candidate
    Menu { candidate: Function, since: Instant },
}

/// Edit state for the display: plan values with the live value filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditView {
    pub kind: EditKind,
    pub index: usize,
    pub values: [i32; 3],
}

/// Snapshot of the state the navigator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavContext {
    pub time: ClockTime,
    /// Alarm (hour, minute)
    pub alarm: (u8, u8),
    /// Counter anniversary (month, day)
    pub counter: (u8, u8),
    pub timer_idle: bool,
    pub timer_preset_s: u32,
    pub signal_active: bool,
}

/// Page navigator
#[derive(Debug, Clone)]
pub struct Navigator {
    mode: Mode,
    overlay: Overlay,
    editor: SettingsEditor,
    mode_since: Instant,
    maintenance: bool,
    suppressed: Option<ControlId>,
    features: Features,
    timeouts: TimeoutConfig,
}

impl Navigator {
    pub fn new(features: Features, timeouts: TimeoutConfig, now: Instant) -> Self {
        Self {
            mode: Mode::Time,
            overlay: Overlay::None,
            editor: SettingsEditor::new(timeouts.setting_timeout_s, timeouts.edit_policy),
            mode_since: now,
            maintenance: false,
            suppressed: None,
            features,
            timeouts,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.overlay, Overlay::Editing(_))
    }

    /// Whether a factory reset is armed (Select held past very-long)
    pub fn maintenance_armed(&self) -> bool {
        self.maintenance
    }

    /// Menu candidate, if the menu is open
    pub fn menu_candidate(&self) -> Option<Function> {
        match self.overlay {
            Overlay::Menu { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    pub fn edit_view(&self) -> Option<EditView> {
        let Overlay::Editing(plan) = self.overlay else {
            return None;
        };
        let mut values = plan.values;
        if let Some(session) = self.editor.session() {
            values[plan.index] = session.value;
        }
        Some(EditView {
            kind: plan.kind,
            index: plan.index,
            values,
        })
    }

    /// Replace the overlay, closing any open edit session
    pub fn set_overlay(&mut self, overlay: Overlay) {
        if let Some(end) = self.editor.clear_set(EndReason::Cancel) {
            debug!("Edit of {} abandoned", end.field);
        }
        self.overlay = overlay;
    }

    /// Jump to the first page of a function
    pub fn go_to_fn(&mut self, function: Function, now: Instant) {
        debug!("Go to {}", function);
        self.set_overlay(Overlay::None);
        self.set_mode(function.first_page(), now);
    }

    /// Back to the time page with nothing open
    pub fn reset(&mut self, now: Instant) {
        self.maintenance = false;
        self.go_to_fn(Function::Time, now);
    }

    fn set_mode(&mut self, mode: Mode, now: Instant) {
        self.mode = mode;
        self.mode_since = now;
    }

    /// Step through pages
    pub fn fn_scroll(&mut self, dir: i8, now: Instant) {
        let next = self.mode.scroll(dir, &self.features);
        self.set_mode(next, now);
    }

    /// Page option for the current page
    pub fn fn_opt_scroll(&self, dir: i8, ctx: &NavContext) -> Option<Command> {
        match self.mode {
            Mode::Alarm => Some(Command::SwitchAlarmState(dir)),
            Mode::Timer if dir >= 0 => Some(Command::TimerStartPause),
            Mode::Timer if ctx.timer_idle => Some(Command::CycleTimer),
            Mode::Timer => Some(Command::TimerClear),
            _ => Some(Command::ToggleSwitch),
        }
    }

    /// Handle one input event
    pub fn handle(&mut self, event: ControlEvent, ctx: &NavContext, now: Instant) -> Option<Command> {
        if let Some(control) = self.suppressed {
            if event.control == control {
                if matches!(event.kind, Transition::Release(_)) {
                    self.suppressed = None;
                }
                return None;
            }
        }

        if ctx.signal_active {
            return self.handle_signal(event);
        }

        match self.overlay {
            Overlay::Editing(_) => self.handle_editing(event, now),
            Overlay::Menu { .. } => {
                self.handle_menu(event, now);
                None
            }
            Overlay::None => self.handle_navigation(event, ctx, now),
        }
    }

    /// While an alert sounds, a tap on the cycle control changes output
    /// and anything else silences it
    fn handle_signal(&mut self, event: ControlEvent) -> Option<Command> {
        let cycle_control = if self.features.has_alt {
            ControlId::Alt
        } else {
            ControlId::Up
        };

        match event.kind {
            Transition::Release(HoldLevel::Tap) if event.control == cycle_control => {
                Some(Command::CycleSignal)
            }
            Transition::Press if event.control == cycle_control => None,
            Transition::Release(_) => Some(Command::DismissSignal),
            Transition::Press | Transition::Hold(_) => {
                self.suppressed = Some(event.control);
                Some(Command::DismissSignal)
            }
        }
    }

    fn handle_navigation(
        &mut self,
        event: ControlEvent,
        ctx: &NavContext,
        now: Instant,
    ) -> Option<Command> {
        match (event.control, event.kind) {
            (ControlId::Select, Transition::Hold(HoldLevel::VeryLong)) => {
                info!("Maintenance armed");
                self.maintenance = true;
                None
            }
            (ControlId::Select, Transition::Hold(HoldLevel::SuperLong)) if self.maintenance => {
                info!("Factory reset requested");
                self.maintenance = false;
                Some(Command::FactoryReset)
            }
            (ControlId::Select, Transition::Release(level)) => {
                if self.maintenance {
                    info!("Maintenance cancelled");
                    self.maintenance = false;
                    return None;
                }
                match level {
                    HoldLevel::Tap => self.fn_scroll(1, now),
                    HoldLevel::Short => self.start_edit(ctx, now),
                    HoldLevel::Long => self.set_overlay(Overlay::Menu {
                        candidate: self.mode.function(),
                        since: now,
                    }),
                    _ => {}
                }
                None
            }
            (ControlId::Alt, Transition::Release(HoldLevel::Tap)) => self.fn_opt_scroll(1, ctx),
            (ControlId::Up | ControlId::Down, Transition::Release(HoldLevel::Tap)) => {
                let dir = event.control.direction();
                if !self.features.has_alt && matches!(self.mode, Mode::Alarm | Mode::Timer) {
                    self.fn_opt_scroll(dir, ctx)
                } else {
                    self.fn_scroll(dir, now);
                    None
                }
            }
            _ => None,
        }
    }

    fn handle_menu(&mut self, event: ControlEvent, now: Instant) {
        let Overlay::Menu { candidate, .. } = self.overlay else {
            return;
        };

        let dir = match (event.control, event.kind) {
            (ControlId::Select, Transition::Release(HoldLevel::Short)) => {
                self.go_to_fn(candidate, now);
                return;
            }
            (ControlId::Alt, Transition::Release(HoldLevel::Tap)) => {
                self.set_overlay(Overlay::None);
                return;
            }
            (ControlId::Select | ControlId::Up, Transition::Release(HoldLevel::Tap)) => 1,
            (ControlId::Down, Transition::Release(HoldLevel::Tap)) => -1,
            _ => return,
        };

        self.overlay = Overlay::Menu {
            candidate: candidate.scroll(dir, &self.features),
            since: now,
        };
    }

    fn start_edit(&mut self, ctx: &NavContext, now: Instant) {
        let Some(kind) = EditKind::for_mode(self.mode, ctx) else {
            return;
        };
        let plan = EditPlan {
            kind,
            index: 0,
            values: kind.initial_values(ctx),
        };
        self.set_overlay(Overlay::Editing(plan));
        self.open_field(now);
    }

    fn open_field(&mut self, now: Instant) {
        let Overlay::Editing(plan) = self.overlay else {
            return;
        };
        let (min, max) = plan.bounds();
        self.editor
            .start_set(plan.field(), plan.values[plan.index], min, max, now);
    }

    fn handle_editing(&mut self, event: ControlEvent, now: Instant) -> Option<Command> {
        match (event.control, event.kind) {
            (ControlId::Up | ControlId::Down, Transition::Release(HoldLevel::Tap))
            | (ControlId::Up | ControlId::Down, Transition::Hold(_)) => {
                let dir = i32::from(event.control.direction());
                self.editor.do_set(dir, event.velocity, now);
                None
            }
            (ControlId::Select, Transition::Release(HoldLevel::Tap)) => {
                self.editor.do_set(1, Velocity::Low, now);
                None
            }
            (ControlId::Select, Transition::Release(HoldLevel::Short)) => self.commit_field(now),
            (ControlId::Alt, Transition::Release(HoldLevel::Tap)) => {
                debug!("Edit cancelled");
                self.set_overlay(Overlay::None);
                None
            }
            _ => {
                self.editor.touch(now);
                None
            }
        }
    }

    /// Commit the current field and move on; after the last field the
    /// plan's command is returned
    fn commit_field(&mut self, now: Instant) -> Option<Command> {
        let Overlay::Editing(mut plan) = self.overlay else {
            return None;
        };
        if let Some(end) = self.editor.clear_set(EndReason::Commit) {
            plan.values[plan.index] = end.value;
        }

        if plan.index + 1 < plan.kind.fields().len() {
            plan.index += 1;
            self.overlay = Overlay::Editing(plan);
            self.open_field(now);
            None
        } else {
            self.set_overlay(Overlay::None);
            Some(plan.command())
        }
    }

    /// Time-driven transitions: edit timeout, menu timeout, temporary pages
    pub fn poll(&mut self, now: Instant) -> Option<Command> {
        match self.overlay {
            Overlay::Editing(mut plan) => {
                let end = self.editor.poll_timeout(now)?;
                self.set_overlay(Overlay::None);
                if !end.committed {
                    return None;
                }
                plan.values[plan.index] = end.value;
                Some(plan.command())
            }
            Overlay::Menu { candidate, since } => {
                if now.has_elapsed(since, u32::from(self.timeouts.fn_page_timeout_s) * 1000) {
                    self.go_to_fn(candidate, now);
                }
                None
            }
            Overlay::None => {
                let timeout_s = match self.mode.temporary()? {
                    PageTimeout::Function => self.timeouts.fn_temp_timeout_s,
                    PageTimeout::SubPage => self.timeouts.fn_page_timeout_s,
                };
                if now.has_elapsed(self.mode_since, u32::from(timeout_s) * 1000) {
                    self.set_mode(Mode::Time, now);
                }
                None
            }
        }
    }
}
