//! The clock controller
//!
//! [`Clock`] is the single state container. Board code builds one at
//! startup and calls [`Clock::tick`] from its polling loop. Each tick runs,
//! in order: input classification and navigation, timekeeping, the alarm
//! and timer, the signal sequencer, persistence and finally composes the
//! display frame.

use crate::alarm::{AlarmOutcome, AlarmScheduler, SkipReason};
use crate::config::{ClockConfig, SettingsBlock, UserSettings};
use crate::display::{compose, DisplayFrame, FrameInputs};
use crate::input::{ControlSamples, InputClassifier};
use crate::signal::{
    OutputKind, SignalEvent, SignalPattern, SignalRequest, SignalSequencer, SignalSource,
};
use crate::state::{Command, Mode, NavContext, Navigator};
use crate::time::{sun_times, ClockTime, Instant, SunTimes, TimeEvents, Timekeeper};
use crate::timer::{Timer, TimerBehavior, TimerEvent};
use crate::traits::{
    AlertOutput, DisplayDriver, LightSensor, SettingsStore, StorageError, TemperatureSensor,
    TimeSource,
};

/// Hardware the clock talks to
#[derive(Debug, Default)]
pub struct Peripherals<D, T, S, L, A, H> {
    pub display: D,
    pub time_source: T,
    pub store: S,
    pub light: L,
    pub alert: A,
    pub temperature: H,
}

impl<D, T, S, L, A, H> Peripherals<D, T, S, L, A, H>
where
    D: DisplayDriver,
    T: TimeSource,
    S: SettingsStore,
    L: LightSensor,
    A: AlertOutput,
    H: TemperatureSensor,
{
    pub fn new(display: D, time_source: T, store: S, light: L, alert: A, temperature: H) -> Self {
        Self {
            display,
            time_source,
            store,
            light,
            alert,
            temperature,
        }
    }
}

/// Alert output wrapper that remembers the last switch level written
struct TrackedAlert<'a, A> {
    inner: &'a mut A,
    switch: &'a mut bool,
}

impl<A: AlertOutput> AlertOutput for TrackedAlert<'_, A> {
    fn emit_pulse(&mut self, kind: OutputKind, duration_ms: u16) {
        self.inner.emit_pulse(kind, duration_ms);
    }

    fn set_switch(&mut self, on: bool) {
        *self.switch = on;
        self.inner.set_switch(on);
    }
}

/// Complete clock state
#[derive(Debug, Clone)]
pub struct Clock {
    config: ClockConfig,
    settings: UserSettings,
    input: InputClassifier,
    navigator: Navigator,
    timekeeper: Timekeeper,
    alarm: AlarmScheduler,
    timer: Timer,
    signal: SignalSequencer,
    sun: SunTimes,
    /// Day the sun times were computed for
    sun_day: Option<i32>,
    temperature_x10: Option<i16>,
    /// Switch turned on by hand
    switch_manual: bool,
    /// Last level written to the switch output
    switch_state: bool,
    dirty: bool,
    last_brightness: Option<u8>,
}

impl Clock {
    /// Build the clock
    ///
    /// The configuration is validated first. Saved settings are loaded;
    /// if there are none, or they fail to verify, factory defaults are
    /// used and written back on the first tick. The initial time comes
    /// from the time source when it answers.
    pub fn new<D, T, S, L, A, H>(
        mut config: ClockConfig,
        p: &mut Peripherals<D, T, S, L, A, H>,
        now: Instant,
    ) -> Self
    where
        D: DisplayDriver,
        T: TimeSource,
        S: SettingsStore,
        L: LightSensor,
        A: AlertOutput,
        H: TemperatureSensor,
    {
        let mut adjusted = config.validate();

        // Blank until the first frame
        p.display.clear(0..config.display.size);

        let (mut settings, mut dirty) = match p.store.load_settings() {
            Ok(block) => {
                info!("Settings loaded");
                (block.settings, false)
            }
            Err(StorageError::Absent) => {
                info!("No saved settings, using defaults");
                (UserSettings::defaults_for(&config), true)
            }
            Err(e) => {
                warn!("Settings unreadable ({}), using defaults", e);
                (UserSettings::defaults_for(&config), true)
            }
        };

        let fixed = settings.validate(&config);
        if fixed > 0 {
            dirty = true;
        }
        adjusted = adjusted.saturating_add(fixed);
        if adjusted > 0 {
            warn!("{} config values adjusted", adjusted);
        }

        let initial = match p.time_source.read_time() {
            Ok(time) => time,
            Err(e) => {
                warn!("No initial time ({}), starting at epoch", e);
                ClockTime::default()
            }
        };

        let mut timekeeper = Timekeeper::new(
            config.features.time_source,
            initial,
            now,
            config.drift_ms_per_s,
            config.drift_interval_s,
        );
        timekeeper.set_dst(settings.dst_rule, settings.dst_active);

        Self {
            input: InputClassifier::new(config.input, config.features.rotary, now),
            navigator: Navigator::new(config.features, config.timeouts, now),
            timekeeper,
            alarm: AlarmScheduler::new(),
            timer: Timer::new(settings.timer_behavior, settings.timer_preset_s),
            signal: SignalSequencer::new(config.signal),
            sun: SunTimes::default(),
            sun_day: None,
            temperature_x10: None,
            switch_manual: false,
            switch_state: false,
            dirty,
            last_brightness: None,
            config,
            settings,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Change user settings outside the edit pages (formats, DST, location)
    ///
    /// The change is persisted on the next tick.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut UserSettings)) {
        let before = self.settings;
        f(&mut self.settings);

        if self.settings.dst_rule != before.dst_rule {
            let t = self.timekeeper.now();
            let active = self
                .settings
                .dst_rule
                .is_dst_by_hour(t.year(), t.month(), t.day(), t.hour())
                .dst;
            self.settings.dst_active = active;
            self.timekeeper.set_dst(self.settings.dst_rule, active);
        }
        if self.settings.timer_preset_s != before.timer_preset_s
            && !self.timer.set_preset(self.settings.timer_preset_s)
        {
            self.settings.timer_preset_s = before.timer_preset_s;
        }
        if self.settings.timer_behavior != before.timer_behavior && !self.timer.is_idle() {
            self.settings.timer_behavior = before.timer_behavior;
        } else if self.settings.timer_behavior != before.timer_behavior {
            self.timer = Timer::new(self.settings.timer_behavior, self.settings.timer_preset_s);
        }

        self.sun_day = None;
        self.dirty = self.dirty || self.settings != before;
    }

    pub fn now(&self) -> ClockTime {
        self.timekeeper.now()
    }

    pub fn mode(&self) -> Mode {
        self.navigator.mode()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn timekeeper(&self) -> &Timekeeper {
        &self.timekeeper
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn signal(&self) -> &SignalSequencer {
        &self.signal
    }

    pub fn sun_times(&self) -> SunTimes {
        self.sun
    }

    /// Level last written to the switch output
    pub fn switch_state(&self) -> bool {
        self.switch_state
    }

    /// Run one iteration of the control loop
    pub fn tick<D, T, S, L, A, H>(
        &mut self,
        now: Instant,
        samples: &ControlSamples,
        p: &mut Peripherals<D, T, S, L, A, H>,
    ) -> DisplayFrame
    where
        D: DisplayDriver,
        T: TimeSource,
        S: SettingsStore,
        L: LightSensor,
        A: AlertOutput,
        H: TemperatureSensor,
    {
        for event in self.input.poll(samples, now) {
            let ctx = self.nav_context();
            if let Some(command) = self.navigator.handle(event, &ctx, now) {
                self.apply(command, now, p);
            }
        }
        if let Some(command) = self.navigator.poll(now) {
            self.apply(command, now, p);
        }

        let events = self.timekeeper.tick(&mut p.time_source, now);
        if self.timekeeper.dst_active() != self.settings.dst_active {
            self.settings.dst_active = self.timekeeper.dst_active();
            self.dirty = true;
        }
        self.run_calendar(events);
        self.run_timer(now);

        let mut alert = TrackedAlert {
            inner: &mut p.alert,
            switch: &mut self.switch_state,
        };
        if let Some(event) = self.signal.tick(now, &mut alert) {
            self.on_signal_event(event);
        }
        self.sync_switch(&mut p.alert);

        if self.dirty {
            self.save(&mut p.store);
        }

        if self.navigator.mode() == Mode::Temperature && (events.second || self.temperature_x10.is_none()) {
            self.temperature_x10 = match p.temperature.read_celsius_x10() {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Temperature read failed: {}", e);
                    None
                }
            };
        }
        let lux = if self.config.features.dimming {
            p.light.read_lux()
        } else {
            None
        };

        let frame = self.compose_frame(now, lux);
        if self.last_brightness != Some(frame.brightness) {
            p.display.set_brightness(frame.brightness);
            self.last_brightness = Some(frame.brightness);
        }
        p.display.render(&frame);
        frame
    }

    /// Apply a command, as if it came from the controls
    pub fn apply<D, T, S, L, A, H>(
        &mut self,
        command: Command,
        now: Instant,
        p: &mut Peripherals<D, T, S, L, A, H>,
    ) where
        D: DisplayDriver,
        T: TimeSource,
        S: SettingsStore,
        L: LightSensor,
        A: AlertOutput,
        H: TemperatureSensor,
    {
        debug!("Apply {}", command);
        match command {
            Command::SetTime { hour, minute } => {
                let current = self.timekeeper.now();
                match current.with_time(hour, minute, 0) {
                    Ok(time) => self.set_time(time, now, &mut p.time_source),
                    Err(e) => warn!("Time rejected: {}", e),
                }
            }
            Command::SetDate { year, month, day } => {
                let current = self.timekeeper.now();
                match current.with_date(year, month, day) {
                    Ok(time) => self.set_time(time, now, &mut p.time_source),
                    Err(e) => warn!("Date rejected: {}", e),
                }
            }
            Command::SetCounter { month, day } => {
                self.settings.counter.month = month;
                self.settings.counter.day = day;
                self.dirty = true;
            }
            Command::SetAlarmTime { hour, minute } => {
                self.settings.alarm.hour = hour;
                self.settings.alarm.minute = minute;
                self.dirty = true;
            }
            Command::SetTimerPreset { seconds } => {
                if self.timer.set_preset(seconds) {
                    self.settings.timer_preset_s = self.timer.preset_s();
                    self.dirty = true;
                }
            }
            Command::SwitchAlarmState(dir) => {
                let state = self.settings.alarm.switch_alarm_state(dir);
                info!("Alarm {}", state);
                self.dirty = true;
            }
            Command::TimerStartPause => {
                self.timer.start_pause(now);
            }
            Command::TimerClear => {
                self.timer.clear();
                self.stop_timer_signal(&mut p.alert);
            }
            Command::CycleTimer => {
                if let Some(behavior) = self.timer.cycle_timer() {
                    self.settings.timer_behavior = behavior;
                    self.dirty = true;
                }
            }
            Command::ToggleSwitch => {
                if self.config.outputs.switch {
                    self.switch_manual = !self.switch_manual;
                    self.sync_switch(&mut p.alert);
                }
            }
            Command::CycleSignal => {
                let mut alert = TrackedAlert {
                    inner: &mut p.alert,
                    switch: &mut self.switch_state,
                };
                self.signal.cycle_signal(&self.config.outputs, &mut alert);
                self.sync_switch(&mut p.alert);
            }
            Command::DismissSignal => {
                let mut alert = TrackedAlert {
                    inner: &mut p.alert,
                    switch: &mut self.switch_state,
                };
                if let Some(event) = self.signal.dismiss(&mut alert) {
                    self.on_signal_event(event);
                }
                self.sync_switch(&mut p.alert);
            }
            Command::FactoryReset => {
                info!("Factory reset");
                self.settings = UserSettings::defaults_for(&self.config);
                self.timer = Timer::new(self.settings.timer_behavior, self.settings.timer_preset_s);
                self.timekeeper
                    .set_dst(self.settings.dst_rule, self.settings.dst_active);
                self.navigator.reset(now);
                self.switch_manual = false;
                self.sun_day = None;
                self.dirty = true;
                self.save(&mut p.store);
            }
        }
    }

    fn nav_context(&self) -> NavContext {
        let s = &self.settings;
        NavContext {
            time: self.timekeeper.now(),
            alarm: (s.alarm.hour, s.alarm.minute),
            counter: (s.counter.month, s.counter.day),
            timer_idle: self.timer.is_idle(),
            timer_preset_s: self.timer.preset_s(),
            signal_active: self.signal.is_active(),
        }
    }

    fn set_time<T: TimeSource>(&mut self, time: ClockTime, now: Instant, source: &mut T) {
        if let Err(e) = self.timekeeper.set_time(source, time, now) {
            warn!("Time source write failed: {}", e);
        }
        self.settings.dst_active = self.timekeeper.dst_active();
        self.sun_day = None;
        self.dirty = true;
    }

    /// Alarm, chime and sun times
    fn run_calendar(&mut self, events: TimeEvents) {
        let time = self.timekeeper.now();
        let features = self.config.features;

        if features.alarm {
            match self
                .alarm
                .check(&mut self.settings.alarm, &time, features.auto_skip)
            {
                Some(AlarmOutcome::Fire) => self.signal.request(SignalRequest {
                    source: SignalSource::Alarm,
                    pattern: self.settings.alarm.pattern,
                    output: self.settings.alarm_output,
                }),
                // The manual skip flag was consumed
                Some(AlarmOutcome::Skipped(SkipReason::Manual)) => self.dirty = true,
                Some(AlarmOutcome::Skipped(SkipReason::Auto)) | None => {}
            }
        }

        if events.hour && time.minute() == 0 && features.chime && self.settings.chime {
            self.chime(&time);
        }

        if features.sun && self.sun_day != Some(time.day_count()) {
            self.sun = sun_times(
                time.year(),
                time.month(),
                time.day(),
                &self.settings.location,
                self.timekeeper.dst_active(),
            );
            self.sun_day = Some(time.day_count());
            debug!("Sun times {} {}", self.sun.rise, self.sun.set);
        }
    }

    fn chime(&mut self, time: &ClockTime) {
        if self.settings.night_dim.is_active(time.minute_of_day()) {
            return;
        }
        let output = match self.settings.chime_output {
            OutputKind::Switch => self.config.outputs.first_audible(),
            kind if self.config.outputs.has(kind) => Some(kind),
            _ => self.config.outputs.first_audible(),
        };
        if let Some(output) = output {
            self.signal.request(SignalRequest {
                source: SignalSource::Chime,
                pattern: SignalPattern::Single,
                output,
            });
        }
    }

    fn run_timer(&mut self, now: Instant) {
        let timeouts = &self.config.timeouts;
        let expiry_ms = u32::from(timeouts.expiry_timeout_s) * 1000;
        let paused_ms = u32::from(timeouts.stopwatch_timeout_s) * 1000;

        match self.timer.tick(now, expiry_ms, paused_ms) {
            Some(TimerEvent::Expired | TimerEvent::Alert) => {
                if self.settings.timer_output == OutputKind::Switch {
                    // Sleep timer: the switch drops when the countdown ends
                    if self.timer.is_expired() {
                        self.timer.clear();
                    }
                } else {
                    self.signal.request(SignalRequest {
                        source: SignalSource::Timer,
                        pattern: self.settings.timer_pattern,
                        output: self.settings.timer_output,
                    });
                }
            }
            Some(TimerEvent::TimedOut) => self.signal.cancel_queued(SignalSource::Timer),
            None => {}
        }
    }

    fn stop_timer_signal<A: AlertOutput>(&mut self, alert: &mut A) {
        self.signal.cancel_queued(SignalSource::Timer);
        if self
            .signal
            .active()
            .is_some_and(|s| s.source == SignalSource::Timer)
        {
            let mut tracked = TrackedAlert {
                inner: alert,
                switch: &mut self.switch_state,
            };
            self.signal.dismiss(&mut tracked);
        }
    }

    /// An expired timer goes back to idle once its signal is over
    fn on_signal_event(&mut self, event: SignalEvent) {
        if let SignalEvent::Ended(SignalSource::Timer, _) = event {
            if self.timer.is_expired() {
                self.timer.clear();
            }
        }
    }

    fn sleep_switch(&self) -> bool {
        self.settings.timer_output == OutputKind::Switch
            && self.timer.is_running()
            && !self.timer.counting_up()
    }

    fn sync_switch<A: AlertOutput>(&mut self, alert: &mut A) {
        if !self.config.outputs.switch {
            return;
        }
        let desired = self.switch_manual || self.sleep_switch() || self.signal.switch_on();
        if desired != self.switch_state {
            alert.set_switch(desired);
            self.switch_state = desired;
        }
    }

    fn save<S: SettingsStore>(&mut self, store: &mut S) {
        self.dirty = false;
        match store.save_settings(&SettingsBlock::new(self.settings)) {
            Ok(()) => debug!("Settings saved"),
            Err(e) => error!("Settings save failed: {}", e),
        }
    }

    /// Timer value for the display: the preset while idle, rounded up
    /// while counting down
    fn timer_display_ms(&self, now: Instant) -> u32 {
        if self.timer.is_idle() {
            return if self.timer.behavior() == TimerBehavior::Stopwatch {
                0
            } else {
                self.timer.preset_s() * 1000
            };
        }
        let value = self.timer.value_ms(now);
        if self.timer.counting_up() {
            value
        } else {
            value.saturating_add(999)
        }
    }

    fn compose_frame(&self, now: Instant, lux: Option<u16>) -> DisplayFrame {
        compose(&FrameInputs {
            mode: self.navigator.mode(),
            menu: self.navigator.menu_candidate(),
            edit: self.navigator.edit_view(),
            time: self.timekeeper.now(),
            settings: &self.settings,
            sun: self.sun,
            timer_ms: self.timer_display_ms(now),
            temperature_x10: self.temperature_x10,
            lux,
            config: &self.config.display,
            dimming: self.config.features.dimming,
        })
    }
}

#[cfg(test)]
mod tests {
    use core::ops::Range;

    use super::*;
    use crate::alarm::AlarmState;
    use crate::traits::{NoLightSensor, NoTemperatureSensor, SensorError};

    #[derive(Default)]
    struct MockDisplay {
        cleared: u32,
        frames: u32,
        last: Option<DisplayFrame>,
        brightness_calls: u32,
    }

    impl DisplayDriver for MockDisplay {
        fn render(&mut self, frame: &DisplayFrame) {
            self.frames += 1;
            self.last = Some(*frame);
        }

        fn set_brightness(&mut self, _level: u8) {
            self.brightness_calls += 1;
        }

        fn clear(&mut self, _positions: Range<u8>) {
            self.cleared += 1;
        }
    }

    struct MockRtc {
        time: ClockTime,
    }

    impl TimeSource for MockRtc {
        fn read_time(&mut self) -> Result<ClockTime, crate::traits::TimeSourceError> {
            Ok(self.time)
        }

        fn write_time(&mut self, time: ClockTime) -> Result<(), crate::traits::TimeSourceError> {
            self.time = time;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockStore {
        block: Option<SettingsBlock>,
        saves: u32,
    }

    impl SettingsStore for MockStore {
        fn load_settings(&mut self) -> Result<SettingsBlock, StorageError> {
            self.block.ok_or(StorageError::Absent)
        }

        fn save_settings(&mut self, block: &SettingsBlock) -> Result<(), StorageError> {
            self.block = Some(*block);
            self.saves += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockAlert {
        pulses: u32,
        switch: bool,
    }

    impl AlertOutput for MockAlert {
        fn emit_pulse(&mut self, _kind: OutputKind, _duration_ms: u16) {
            self.pulses += 1;
        }

        fn set_switch(&mut self, on: bool) {
            self.switch = on;
        }
    }

    struct FixedTemperature(i16);

    impl TemperatureSensor for FixedTemperature {
        fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
            Ok(self.0)
        }
    }

    type TestPeripherals =
        Peripherals<MockDisplay, MockRtc, MockStore, NoLightSensor, MockAlert, NoTemperatureSensor>;

    fn t(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8) -> ClockTime {
        ClockTime::new(y, mo, d, h, mi, s).unwrap()
    }

    fn at(ms: u32) -> Instant {
        Instant::from_millis(ms)
    }

    fn peripherals(time: ClockTime) -> TestPeripherals {
        Peripherals::new(
            MockDisplay::default(),
            MockRtc { time },
            MockStore::default(),
            NoLightSensor,
            MockAlert::default(),
            NoTemperatureSensor,
        )
    }

    fn idle() -> ControlSamples {
        ControlSamples::default()
    }

    #[test]
    fn test_defaults_saved_on_first_tick() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        assert_eq!(clock.now(), t(2024, 5, 1, 12, 0, 0));
        assert_eq!(p.display.cleared, 1);

        clock.tick(at(10), &idle(), &mut p);
        assert_eq!(p.store.saves, 1);
        assert_eq!(p.display.frames, 1);
        assert_eq!(p.display.brightness_calls, 1);

        clock.tick(at(20), &idle(), &mut p);
        assert_eq!(p.store.saves, 1);
        assert_eq!(p.display.brightness_calls, 1);
    }

    #[test]
    fn test_loaded_settings_are_clamped() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut settings = UserSettings::default();
        settings.alarm.hour = 30;
        settings.counter.month = 13;
        p.store.block = Some(SettingsBlock::new(settings));

        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        assert_eq!(clock.settings().alarm.hour, 23);
        assert_eq!(clock.settings().counter.month, 12);

        // Repaired values are written back
        clock.tick(at(10), &idle(), &mut p);
        assert_eq!(p.store.saves, 1);
    }

    #[test]
    fn test_saved_settings_loaded() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut settings = UserSettings::default();
        settings.alarm.hour = 5;
        settings.timer_preset_s = 42;
        p.store.block = Some(SettingsBlock::new(settings));

        let clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        assert_eq!(clock.settings().alarm.hour, 5);
        assert_eq!(clock.timer().preset_s(), 42);
    }

    #[test]
    fn test_alarm_fires_once() {
        let mut p = peripherals(t(2024, 5, 1, 6, 59, 59));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.update_settings(|s| s.alarm.state = AlarmState::On);

        clock.tick(at(500), &idle(), &mut p);
        assert!(!clock.signal().is_active());

        clock.tick(at(1000), &idle(), &mut p);
        assert_eq!(clock.now(), t(2024, 5, 1, 7, 0, 0));
        assert_eq!(
            clock.signal().active().map(|s| s.source),
            Some(SignalSource::Alarm)
        );
        assert_eq!(p.alert.pulses, 1);

        // Dismiss and keep polling within the same minute
        clock.apply(Command::DismissSignal, at(1100), &mut p);
        for ms in (1200..30_000).step_by(500) {
            clock.tick(at(ms), &idle(), &mut p);
        }
        assert!(!clock.signal().is_active());
        assert_eq!(p.alert.pulses, 1);
    }

    #[test]
    fn test_invalid_date_keeps_time() {
        let mut p = peripherals(t(2023, 3, 15, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.apply(
            Command::SetDate {
                year: 2023,
                month: 2,
                day: 29,
            },
            at(0),
            &mut p,
        );
        assert_eq!(clock.now(), t(2023, 3, 15, 12, 0, 0));

        clock.apply(
            Command::SetDate {
                year: 2024,
                month: 2,
                day: 29,
            },
            at(0),
            &mut p,
        );
        assert_eq!(clock.now(), t(2024, 2, 29, 12, 0, 0));
    }

    #[test]
    fn test_timer_dismiss_returns_to_idle() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.apply(Command::SetTimerPreset { seconds: 2 }, at(0), &mut p);
        clock.apply(Command::TimerStartPause, at(0), &mut p);

        clock.tick(at(2000), &idle(), &mut p);
        assert!(clock.timer().is_expired());
        assert!(clock.signal().is_active());

        clock.apply(Command::DismissSignal, at(2100), &mut p);
        assert!(clock.timer().is_idle());
        clock.tick(at(2200), &idle(), &mut p);
        assert!(!clock.signal().is_active());
    }

    #[test]
    fn test_sleep_switch() {
        let mut config = ClockConfig::default();
        config.outputs.switch = true;
        let mut p = peripherals(t(2024, 5, 1, 22, 0, 0));
        let mut clock = Clock::new(config, &mut p, at(0));
        clock.update_settings(|s| {
            s.timer_output = OutputKind::Switch;
            s.timer_preset_s = 60;
        });

        clock.apply(Command::TimerStartPause, at(0), &mut p);
        clock.tick(at(10), &idle(), &mut p);
        assert!(p.alert.switch);

        clock.tick(at(60_000), &idle(), &mut p);
        assert!(!p.alert.switch);
        assert!(clock.timer().is_idle());
        assert!(!clock.signal().is_active());
    }

    #[test]
    fn test_manual_switch_needs_output() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.apply(Command::ToggleSwitch, at(0), &mut p);
        assert!(!clock.switch_state());

        let mut config = ClockConfig::default();
        config.outputs.switch = true;
        let mut clock = Clock::new(config, &mut p, at(0));
        clock.apply(Command::ToggleSwitch, at(0), &mut p);
        assert!(p.alert.switch);
        clock.apply(Command::ToggleSwitch, at(0), &mut p);
        assert!(!p.alert.switch);
    }

    #[test]
    fn test_factory_reset() {
        let mut p = peripherals(t(2024, 5, 1, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.apply(Command::SetAlarmTime { hour: 5, minute: 15 }, at(0), &mut p);
        clock.tick(at(10), &idle(), &mut p);
        assert_eq!(p.store.block.unwrap().settings.alarm.hour, 5);

        clock.apply(Command::FactoryReset, at(20), &mut p);
        assert_eq!(clock.settings().alarm.hour, 7);
        assert_eq!(p.store.block.unwrap().settings.alarm.hour, 7);
        assert_eq!(clock.mode(), Mode::Time);
    }

    #[test]
    fn test_hourly_chime() {
        let mut p = peripherals(t(2024, 5, 1, 9, 59, 59));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.update_settings(|s| s.chime = true);

        clock.tick(at(1000), &idle(), &mut p);
        assert_eq!(clock.now(), t(2024, 5, 1, 10, 0, 0));
        assert_eq!(
            clock.signal().active().map(|s| s.source),
            Some(SignalSource::Chime)
        );
        assert_eq!(p.alert.pulses, 1);
    }

    #[test]
    fn test_temperature_page_reads_sensor() {
        let mut config = ClockConfig::default();
        config.features.temperature = true;
        let mut p = Peripherals::new(
            MockDisplay::default(),
            MockRtc {
                time: t(2024, 5, 1, 12, 0, 0),
            },
            MockStore::default(),
            NoLightSensor,
            MockAlert::default(),
            FixedTemperature(215),
        );
        let mut clock = Clock::new(config, &mut p, at(0));
        clock.navigator.go_to_fn(crate::state::Function::Temperature, at(0));

        let frame = clock.tick(at(10), &idle(), &mut p);
        assert_eq!(&frame.digits[3..], &[Some(2), Some(1), Some(5)]);
    }

    #[test]
    fn test_dst_rule_change_persists_flag() {
        let mut p = peripherals(t(2024, 7, 1, 12, 0, 0));
        let mut clock = Clock::new(ClockConfig::default(), &mut p, at(0));
        clock.update_settings(|s| s.dst_rule = crate::time::DstRule::Europe);
        assert!(clock.settings().dst_active);
        assert!(clock.timekeeper().dst_active());
    }
}
